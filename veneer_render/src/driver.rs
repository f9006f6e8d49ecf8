// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Streaming-buffer device contract.

use veneer_core::format::FourCc;
use veneer_core::plane::{PhysAddr, PlaneInput};

use crate::error::DeviceError;
use crate::resource::DeviceHandle;

/// Geometry of the buffer ring a device is opened for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferParams {
    /// Pixel format.
    pub format: FourCc,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of buffers in the ring.
    pub count: u32,
}

impl BufferParams {
    /// Parameters matching a plane input description.
    #[must_use]
    pub fn from_input(input: &PlaneInput) -> Self {
        Self {
            format: input.format,
            width: input.width,
            height: input.height,
            count: u32::try_from(input.buffer_count()).unwrap_or(u32::MAX),
        }
    }
}

/// A driver that exposes physically addressed buffers as GPU streaming
/// texture sources.
///
/// Device slots are chosen by the caller; the driver only opens, binds, and
/// closes them. All calls happen on the render thread.
pub trait StreamingDriver {
    /// Opens `device` for a ring described by `params`.
    fn open(&mut self, device: DeviceHandle, params: &BufferParams) -> Result<(), DeviceError>;

    /// Points buffer `index` of `device` at `addr`.
    fn bind(&mut self, device: DeviceHandle, index: u32, addr: PhysAddr) -> Result<(), DeviceError>;

    /// Closes `device`. Its bindings are forgotten.
    fn close(&mut self, device: DeviceHandle) -> Result<(), DeviceError>;
}
