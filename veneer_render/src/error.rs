// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use veneer_core::ConfigError;

use crate::resource::DeviceHandle;

/// Failure in the device pool, streaming driver, or GPU backend.
///
/// None of these are retried: each means a resource budget or a plane
/// configuration was violated.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DeviceError {
    /// Every slot of the device pool is in use.
    #[error("streaming device pool exhausted ({capacity} devices)")]
    PoolExhausted {
        /// Pool size.
        capacity: usize,
    },
    /// The handle does not name an open device.
    #[error("{0:?} is not open")]
    NotOpen(DeviceHandle),
    /// Buffer index past the device's buffer count.
    #[error("buffer {index} out of range for {device:?} with {count} buffers")]
    BufferOutOfRange {
        /// Device addressed.
        device: DeviceHandle,
        /// Requested index.
        index: u32,
        /// Buffers the device was opened with.
        count: u32,
    },
    /// The driver rejected a request.
    #[error("driver rejected {op} on {device:?} (code {code})")]
    Driver {
        /// Device addressed.
        device: DeviceHandle,
        /// Operation name.
        op: &'static str,
        /// Driver status code.
        code: i32,
    },
    /// The GPU could not allocate a texture for the device.
    #[error("texture creation failed for {0:?}")]
    TextureCreation(DeviceHandle),
    /// The plane configuration cannot be realized.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
