// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device pool and per-plane texture lifecycle.

use alloc::vec;
use alloc::vec::Vec;

use veneer_core::ConfigError;
use veneer_core::geometry::{Quad, texcoord_quad};
use veneer_core::plane::{PhysAddr, PlaneInput};

use crate::backend::GpuBackend;
use crate::driver::{BufferParams, StreamingDriver};
use crate::error::DeviceError;
use crate::resource::{DeviceHandle, TextureId};

/// Device pool size when none is configured.
pub const DEFAULT_DEVICE_POOL: usize = 8;

/// GPU-side resources realized for one plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneResources {
    /// Streaming device holding the plane's buffer ring.
    pub device: DeviceHandle,
    /// Texture sampling from `device`.
    pub texture: TextureId,
    /// Texture coordinates for the plane's crop.
    pub texcoords: Quad,
    /// Parameters `device` was opened with.
    pub params: BufferParams,
}

/// Maps plane buffer rings to streaming devices and textures.
///
/// Devices come from a fixed pool; running out is an error, never a wait.
/// Only the render thread touches the manager.
#[derive(Debug)]
pub struct BufferTextureManager<D> {
    driver: D,
    in_use: Vec<bool>,
}

impl<D: StreamingDriver> BufferTextureManager<D> {
    /// Creates a manager with `pool_size` device slots.
    #[must_use]
    pub fn new(driver: D, pool_size: usize) -> Self {
        Self {
            driver,
            in_use: vec![false; pool_size],
        }
    }

    /// The underlying driver.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Number of pool slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.in_use.len()
    }

    /// Number of open devices.
    #[must_use]
    pub fn devices_in_use(&self) -> usize {
        self.in_use.iter().filter(|&&u| u).count()
    }

    fn slot(&self, device: DeviceHandle) -> Result<usize, DeviceError> {
        let idx = device.0 as usize;
        match self.in_use.get(idx) {
            Some(true) => Ok(idx),
            _ => Err(DeviceError::NotOpen(device)),
        }
    }

    /// Opens a device from the pool for a ring described by `params`.
    pub fn acquire_device(&mut self, params: &BufferParams) -> Result<DeviceHandle, DeviceError> {
        let exhausted = DeviceError::PoolExhausted {
            capacity: self.capacity(),
        };
        let idx = self.in_use.iter().position(|&u| !u).ok_or(exhausted.clone())?;
        let device = DeviceHandle(u32::try_from(idx).map_err(|_| exhausted)?);
        self.driver.open(device, params)?;
        self.in_use[idx] = true;
        Ok(device)
    }

    /// Points buffer `index` of `device` at `addr`.
    pub fn bind_physical_address(
        &mut self,
        device: DeviceHandle,
        index: u32,
        addr: PhysAddr,
    ) -> Result<(), DeviceError> {
        self.slot(device)?;
        self.driver.bind(device, index, addr)
    }

    /// Reopens `device` with new parameters, keeping its handle.
    ///
    /// `texture`, the texture currently sampling from the device, is deleted
    /// first. Bindings do not survive; rebind every buffer afterwards. If the
    /// device cannot be reopened its slot is freed.
    pub fn recreate_device<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        device: DeviceHandle,
        texture: Option<TextureId>,
        params: &BufferParams,
    ) -> Result<DeviceHandle, DeviceError> {
        let idx = self.slot(device)?;
        if let Some(texture) = texture {
            backend.delete_texture(texture);
        }
        let reopened = self
            .driver
            .close(device)
            .and_then(|()| self.driver.open(device, params));
        if let Err(e) = reopened {
            self.in_use[idx] = false;
            return Err(e);
        }
        Ok(device)
    }

    /// Allocates a nearest-filtered texture streaming from `device`.
    pub fn create_texture<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        device: DeviceHandle,
    ) -> Result<TextureId, DeviceError> {
        self.slot(device)?;
        backend.create_texture(device)
    }

    /// Closes `device` and returns its slot to the pool.
    pub fn release_device(&mut self, device: DeviceHandle) -> Result<(), DeviceError> {
        let idx = self.slot(device)?;
        self.in_use[idx] = false;
        self.driver.close(device)
    }

    /// Texture coordinates for the input's crop.
    pub fn crop_quad(input: &PlaneInput) -> Result<Quad, ConfigError> {
        texcoord_quad(&input.crop, input.width, input.height)
    }

    /// Brings a plane's resources in line with `input`.
    ///
    /// With no `current` resources a device is acquired; otherwise the
    /// plane's device is recreated and its old texture deleted. Every buffer
    /// is then bound and a fresh texture created. The crop is checked before
    /// any device is touched.
    ///
    /// `current` is consumed either way. On error its texture is deleted and
    /// the plane's device is back in the pool.
    pub fn materialize<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        current: Option<&PlaneResources>,
        input: &PlaneInput,
    ) -> Result<PlaneResources, DeviceError> {
        let texcoords = match Self::crop_quad(input) {
            Ok(quad) => quad,
            Err(e) => {
                if let Some(res) = current {
                    backend.delete_texture(res.texture);
                    let _ = self.release_device(res.device);
                }
                return Err(e.into());
            }
        };
        let params = BufferParams::from_input(input);
        let device = match current {
            Some(res) => self.recreate_device(backend, res.device, Some(res.texture), &params)?,
            None => self.acquire_device(&params)?,
        };
        match self.populate(backend, device, &input.buffers) {
            Ok(texture) => Ok(PlaneResources {
                device,
                texture,
                texcoords,
                params,
            }),
            Err(e) => {
                // Report the populate error, not the close.
                let _ = self.release_device(device);
                Err(e)
            }
        }
    }

    fn populate<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        device: DeviceHandle,
        buffers: &[PhysAddr],
    ) -> Result<TextureId, DeviceError> {
        for (index, addr) in (0_u32..).zip(buffers) {
            self.bind_physical_address(device, index, *addr)?;
        }
        self.create_texture(backend, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::{GpuCall, RecordingBackend, SoftwareDriver};
    use veneer_core::error::Axis;
    use veneer_core::format::FourCc;
    use veneer_core::plane::CropRect;

    fn input(buffers: usize, format: FourCc) -> PlaneInput {
        PlaneInput {
            buffers: (0..buffers as u64).map(|i| PhysAddr(0x4000_0000 + (i << 20))).collect(),
            width: 120,
            height: 80,
            format,
            rotation_degrees: 0.0,
            crop: CropRect::default(),
        }
    }

    #[test]
    fn pool_exhaustion_is_an_error() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), 2);
        let p = BufferParams::from_input(&input(1, FourCc::UYVY));
        mgr.acquire_device(&p).unwrap();
        mgr.acquire_device(&p).unwrap();
        assert_eq!(mgr.acquire_device(&p), Err(DeviceError::PoolExhausted { capacity: 2 }));
    }

    #[test]
    fn released_slot_is_reused() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), 1);
        let p = BufferParams::from_input(&input(1, FourCc::UYVY));
        let d = mgr.acquire_device(&p).unwrap();
        mgr.release_device(d).unwrap();
        assert_eq!(mgr.acquire_device(&p), Ok(d));
    }

    #[test]
    fn materialize_binds_every_buffer_then_creates_texture() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), DEFAULT_DEVICE_POOL);
        let mut gpu = RecordingBackend::new();
        let inp = input(3, FourCc::NV12);
        let res = mgr.materialize(&mut gpu, None, &inp).unwrap();

        let dev = mgr.driver().device(res.device).unwrap();
        let bound: Vec<_> = dev.bindings.iter().map(|b| b.unwrap()).collect();
        assert_eq!(bound, inp.buffers);
        assert_eq!(gpu.calls(), &[GpuCall::CreateTexture {
            texture: res.texture,
            device: res.device,
        }]);
    }

    #[test]
    fn recreate_deletes_old_texture_before_creating_new() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), DEFAULT_DEVICE_POOL);
        let mut gpu = RecordingBackend::new();
        let first = mgr.materialize(&mut gpu, None, &input(2, FourCc::UYVY)).unwrap();
        gpu.take_calls();

        let second = mgr
            .materialize(&mut gpu, Some(&first), &input(4, FourCc::YUYV))
            .unwrap();
        assert_eq!(second.device, first.device, "handle survives recreation");
        assert_ne!(second.texture, first.texture);
        let calls = gpu.calls();
        assert_eq!(calls[0], GpuCall::DeleteTexture(first.texture));
        assert!(matches!(calls[1], GpuCall::CreateTexture { .. }), "{calls:?}");
        assert_eq!(gpu.live_textures(), 1);
        assert_eq!(mgr.driver().device(second.device).unwrap().params.count, 4);
        assert_eq!(mgr.devices_in_use(), 1);
    }

    #[test]
    fn bad_crop_fails_before_touching_devices() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), DEFAULT_DEVICE_POOL);
        let mut gpu = RecordingBackend::new();
        let mut inp = input(1, FourCc::UYVY);
        inp.crop = CropRect {
            x: 0,
            y: 40,
            width: 0,
            height: 41,
        };
        let err = mgr.materialize(&mut gpu, None, &inp).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Config(ConfigError::CropOutOfBounds {
                axis: Axis::Vertical,
                ..
            })
        ), "unexpected error {err:?}");
        assert_eq!(mgr.devices_in_use(), 0);
        assert!(gpu.calls().is_empty(), "no GPU work for a rejected crop");
    }

    #[test]
    fn failed_texture_creation_returns_the_device() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), 1);
        let mut gpu = RecordingBackend::new();
        gpu.fail_texture_creation(true);
        let err = mgr.materialize(&mut gpu, None, &input(2, FourCc::UYVY)).unwrap_err();
        assert_eq!(err, DeviceError::TextureCreation(DeviceHandle(0)));
        assert_eq!(mgr.devices_in_use(), 0, "slot went back to the pool");
        assert_eq!(mgr.driver().open_devices(), 0, "driver device closed");

        gpu.fail_texture_creation(false);
        let res = mgr.materialize(&mut gpu, None, &input(2, FourCc::UYVY)).unwrap();
        assert_eq!(res.device, DeviceHandle(0));
    }

    #[test]
    fn failed_recreation_deletes_old_texture_once_and_frees_device() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), DEFAULT_DEVICE_POOL);
        let mut gpu = RecordingBackend::new();
        let first = mgr.materialize(&mut gpu, None, &input(1, FourCc::ARGB)).unwrap();
        gpu.take_calls();

        gpu.fail_texture_creation(true);
        let err = mgr
            .materialize(&mut gpu, Some(&first), &input(1, FourCc::RGB565))
            .unwrap_err();
        assert_eq!(err, DeviceError::TextureCreation(first.device));
        assert_eq!(gpu.calls(), &[GpuCall::DeleteTexture(first.texture)]);
        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(mgr.devices_in_use(), 0);
        assert_eq!(mgr.driver().open_devices(), 0);
    }

    #[test]
    fn rejected_reconfigure_frees_old_resources() {
        let mut mgr = BufferTextureManager::new(SoftwareDriver::new(), DEFAULT_DEVICE_POOL);
        let mut gpu = RecordingBackend::new();
        let first = mgr.materialize(&mut gpu, None, &input(1, FourCc::UYVY)).unwrap();
        gpu.take_calls();

        let mut bad = input(1, FourCc::UYVY);
        bad.crop = CropRect {
            x: 100,
            y: 0,
            width: 21,
            height: 0,
        };
        let err = mgr.materialize(&mut gpu, Some(&first), &bad).unwrap_err();
        assert!(matches!(err, DeviceError::Config(_)), "unexpected error {err:?}");
        assert_eq!(gpu.calls(), &[GpuCall::DeleteTexture(first.texture)]);
        assert_eq!(mgr.devices_in_use(), 0);
        assert_eq!(mgr.driver().open_devices(), 0);
    }
}
