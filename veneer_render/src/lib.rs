// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Streaming-buffer devices, GPU backend contract, and draw plans for veneer.
//!
//! This crate sits between the plane model in [`veneer_core`] and whatever
//! actually puts pixels on a display. It defines:
//!
//! - [`StreamingDriver`] — opens a device that exposes producer-owned,
//!   physically addressed buffers as a GPU streaming texture source
//! - [`GpuBackend`] — the handful of GPU operations the compositor issues
//! - [`BufferTextureManager`] — device pool and texture lifecycle per plane
//! - [`RenderPlan`] / [`DrawItem`] — one frame's ordered draws, and
//!   [`submit_plan`] to issue them with per-draw blend scoping
//! - [`SoftwareDriver`] / [`RecordingBackend`] — hardware-free
//!   implementations that record what they were asked to do

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod backend;
mod driver;
mod error;
mod plan;
mod resource;
mod software;
mod texture;

pub use backend::{GpuBackend, submit_plan};
pub use driver::{BufferParams, StreamingDriver};
pub use error::DeviceError;
pub use plan::{DrawItem, ProgramKind, RenderPlan};
pub use resource::{DeviceHandle, TextureId};
pub use software::{GpuCall, RecordingBackend, SoftwareDevice, SoftwareDriver};
pub use texture::{BufferTextureManager, DEFAULT_DEVICE_POOL, PlaneResources};
