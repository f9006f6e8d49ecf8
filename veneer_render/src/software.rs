// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware-free driver and backend.
//!
//! [`SoftwareDriver`] keeps device state in memory and validates every call
//! the way a kernel driver would. [`RecordingBackend`] records the GPU calls
//! it receives. Together they run the whole compositor without a display,
//! which is what the headless demo and the tests do.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec;
use alloc::vec::Vec;

use veneer_core::geometry::Quad;
use veneer_core::plane::{BlendMode, PhysAddr};

use crate::backend::GpuBackend;
use crate::driver::{BufferParams, StreamingDriver};
use crate::error::DeviceError;
use crate::plan::ProgramKind;
use crate::resource::{DeviceHandle, TextureId};

const EBUSY: i32 = -16;

// ---------------------------------------------------------------------------
// SoftwareDriver
// ---------------------------------------------------------------------------

/// State of one open software device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoftwareDevice {
    /// Parameters the device was opened with.
    pub params: BufferParams,
    /// Address bound to each buffer slot, if any.
    pub bindings: Vec<Option<PhysAddr>>,
}

/// In-memory [`StreamingDriver`].
#[derive(Debug, Default)]
pub struct SoftwareDriver {
    devices: BTreeMap<DeviceHandle, SoftwareDevice>,
    opens: u32,
    closes: u32,
}

impl SoftwareDriver {
    /// Creates a driver with no open devices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of an open device.
    #[must_use]
    pub fn device(&self, device: DeviceHandle) -> Option<&SoftwareDevice> {
        self.devices.get(&device)
    }

    /// Number of currently open devices.
    #[must_use]
    pub fn open_devices(&self) -> usize {
        self.devices.len()
    }

    /// Total successful `open` calls.
    #[must_use]
    pub fn open_count(&self) -> u32 {
        self.opens
    }

    /// Total successful `close` calls.
    #[must_use]
    pub fn close_count(&self) -> u32 {
        self.closes
    }
}

impl StreamingDriver for SoftwareDriver {
    fn open(&mut self, device: DeviceHandle, params: &BufferParams) -> Result<(), DeviceError> {
        if self.devices.contains_key(&device) {
            return Err(DeviceError::Driver {
                device,
                op: "open",
                code: EBUSY,
            });
        }
        self.devices.insert(
            device,
            SoftwareDevice {
                params: *params,
                bindings: vec![None; params.count as usize],
            },
        );
        self.opens += 1;
        Ok(())
    }

    fn bind(&mut self, device: DeviceHandle, index: u32, addr: PhysAddr) -> Result<(), DeviceError> {
        let dev = self.devices.get_mut(&device).ok_or(DeviceError::NotOpen(device))?;
        let count = dev.params.count;
        let slot = dev
            .bindings
            .get_mut(index as usize)
            .ok_or(DeviceError::BufferOutOfRange {
                device,
                index,
                count,
            })?;
        *slot = Some(addr);
        Ok(())
    }

    fn close(&mut self, device: DeviceHandle) -> Result<(), DeviceError> {
        self.devices.remove(&device).ok_or(DeviceError::NotOpen(device))?;
        self.closes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingBackend
// ---------------------------------------------------------------------------

/// One call received by a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    /// `create_texture`.
    CreateTexture {
        /// Texture handed out.
        texture: TextureId,
        /// Source device.
        device: DeviceHandle,
    },
    /// `delete_texture`.
    DeleteTexture(TextureId),
    /// `use_program`.
    UseProgram(ProgramKind),
    /// `set_transform`.
    SetTransform([f32; 16]),
    /// `bind_stream`.
    BindStream {
        /// Texture bound.
        texture: TextureId,
        /// Source device.
        device: DeviceHandle,
        /// Buffer selected.
        buffer_index: u32,
    },
    /// `enable_blend`.
    EnableBlend(BlendMode),
    /// `disable_blend`.
    DisableBlend,
    /// `draw_quad`.
    Draw {
        /// Output quad.
        vertices: Quad,
        /// Texture coordinates.
        texcoords: Quad,
    },
    /// `clear`.
    Clear,
    /// `present`.
    Present,
    /// `release`.
    Release,
}

/// A [`GpuBackend`] that records every call.
///
/// [`RecordingBackend::counting`] keeps only counters, for long headless runs.
#[derive(Debug)]
pub struct RecordingBackend {
    calls: Vec<GpuCall>,
    keep_calls: bool,
    next_texture: u32,
    live: BTreeSet<TextureId>,
    presents: u64,
    fail_textures: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Creates a backend that keeps the full call history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            keep_calls: true,
            next_texture: 1,
            live: BTreeSet::new(),
            presents: 0,
            fail_textures: false,
        }
    }

    /// Creates a backend that keeps counters but no call history.
    #[must_use]
    pub fn counting() -> Self {
        Self {
            keep_calls: false,
            ..Self::new()
        }
    }

    /// Makes subsequent `create_texture` calls fail.
    pub fn fail_texture_creation(&mut self, fail: bool) {
        self.fail_textures = fail;
    }

    /// Recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Takes the recorded calls, leaving the history empty.
    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        core::mem::take(&mut self.calls)
    }

    /// Frames presented so far.
    #[must_use]
    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// Textures created and not yet deleted.
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    fn record(&mut self, call: GpuCall) {
        if self.keep_calls {
            self.calls.push(call);
        }
    }
}

impl GpuBackend for RecordingBackend {
    fn create_texture(&mut self, device: DeviceHandle) -> Result<TextureId, DeviceError> {
        if self.fail_textures {
            return Err(DeviceError::TextureCreation(device));
        }
        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live.insert(texture);
        self.record(GpuCall::CreateTexture { texture, device });
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.live.remove(&texture);
        self.record(GpuCall::DeleteTexture(texture));
    }

    fn use_program(&mut self, program: ProgramKind) {
        self.record(GpuCall::UseProgram(program));
    }

    fn set_transform(&mut self, cols: &[f32; 16]) {
        self.record(GpuCall::SetTransform(*cols));
    }

    fn bind_stream(&mut self, texture: TextureId, device: DeviceHandle, buffer_index: u32) {
        self.record(GpuCall::BindStream {
            texture,
            device,
            buffer_index,
        });
    }

    fn enable_blend(&mut self, blend: BlendMode) {
        self.record(GpuCall::EnableBlend(blend));
    }

    fn disable_blend(&mut self) {
        self.record(GpuCall::DisableBlend);
    }

    fn draw_quad(&mut self, vertices: &Quad, texcoords: &Quad) {
        self.record(GpuCall::Draw {
            vertices: *vertices,
            texcoords: *texcoords,
        });
    }

    fn clear(&mut self) {
        self.record(GpuCall::Clear);
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        self.presents += 1;
        self.record(GpuCall::Present);
        Ok(())
    }

    fn release(&mut self) {
        self.record(GpuCall::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_core::format::FourCc;

    fn params(count: u32) -> BufferParams {
        BufferParams {
            format: FourCc::NV12,
            width: 64,
            height: 64,
            count,
        }
    }

    #[test]
    fn driver_rejects_double_open() {
        let mut d = SoftwareDriver::new();
        d.open(DeviceHandle(0), &params(2)).unwrap();
        assert!(matches!(
            d.open(DeviceHandle(0), &params(2)),
            Err(DeviceError::Driver { op: "open", .. })
        ), "second open must be rejected");
    }

    #[test]
    fn driver_bounds_buffer_index() {
        let mut d = SoftwareDriver::new();
        d.open(DeviceHandle(3), &params(2)).unwrap();
        d.bind(DeviceHandle(3), 1, PhysAddr(0x1000)).unwrap();
        assert_eq!(
            d.bind(DeviceHandle(3), 2, PhysAddr(0x2000)),
            Err(DeviceError::BufferOutOfRange {
                device: DeviceHandle(3),
                index: 2,
                count: 2
            })
        );
        let dev = d.device(DeviceHandle(3)).unwrap();
        assert_eq!(dev.bindings, vec![None, Some(PhysAddr(0x1000))]);
    }

    #[test]
    fn close_forgets_device() {
        let mut d = SoftwareDriver::new();
        d.open(DeviceHandle(1), &params(1)).unwrap();
        d.close(DeviceHandle(1)).unwrap();
        assert_eq!(d.open_devices(), 0);
        assert_eq!(d.close(DeviceHandle(1)), Err(DeviceError::NotOpen(DeviceHandle(1))));
        assert_eq!((d.open_count(), d.close_count()), (1, 1));
    }

    #[test]
    fn counting_backend_keeps_no_history() {
        let mut b = RecordingBackend::counting();
        b.clear();
        b.present().unwrap();
        assert!(b.calls().is_empty(), "counting backend records nothing");
        assert_eq!(b.presents(), 1);
    }

    #[test]
    fn texture_ids_are_unique_and_tracked() {
        let mut b = RecordingBackend::new();
        let t1 = b.create_texture(DeviceHandle(0)).unwrap();
        let t2 = b.create_texture(DeviceHandle(1)).unwrap();
        assert_ne!(t1, t2);
        b.delete_texture(t1);
        assert_eq!(b.live_textures(), 1);
    }
}
