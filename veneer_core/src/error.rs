// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.
//!
//! Everything in [`ConfigError`] describes a producer or operator
//! misconfiguration. Continuing past one would mean sampling outside a
//! buffer or drawing with a broken transform, so callers treat these as
//! fatal.

use core::fmt;

/// Which axis of a crop rectangle was out of bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal (`crop_x` / `crop_width`).
    Horizontal,
    /// Vertical (`crop_y` / `crop_height`).
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Horizontal => "x",
            Self::Vertical => "y",
        })
    }
}

/// A plane configuration that cannot be applied.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `offset + extent` exceeds the source dimension on one axis.
    #[error("crop {axis} range {offset}+{extent} exceeds source extent {limit}")]
    CropOutOfBounds {
        /// Offending axis.
        axis: Axis,
        /// Crop origin on that axis, in source pixels.
        offset: u32,
        /// Crop extent on that axis, in source pixels.
        extent: u32,
        /// Source dimension on that axis.
        limit: u32,
    },
    /// More buffers than a video channel may carry.
    #[error("{count} buffers requested, channel maximum is {max}")]
    TooManyBuffers {
        /// Requested buffer count.
        count: u32,
        /// Per-channel maximum.
        max: usize,
    },
    /// A configuration with no buffers to stream from.
    #[error("configuration carries no buffers")]
    NoBuffers,
    /// Zero-sized source surface.
    #[error("empty source surface {width}x{height}")]
    EmptySource {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
    },
    /// A geometry or rotation field is NaN or infinite.
    #[error("non-finite value in `{field}`")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
}
