// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fourcc pixel formats.

use core::fmt;

/// A fourcc pixel format code, packed little-endian (`a | b<<8 | c<<16 | d<<24`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FourCc(pub u32);

impl FourCc {
    /// RGB 5:6:5, 16 bits per pixel.
    pub const RGB565: Self = Self::from_bytes(*b"RGBP");
    /// ARGB 8:8:8:8, 32 bits per pixel.
    pub const ARGB: Self = Self::from_bytes(*b"ARGB");
    /// Packed YUV 4:2:2, `U Y0 V Y1` order.
    pub const UYVY: Self = Self::from_bytes(*b"UYVY");
    /// Packed YUV 4:2:2, `Y0 U Y1 V` order.
    pub const YUYV: Self = Self::from_bytes(*b"YUYV");
    /// Semi-planar YUV 4:2:0.
    pub const NV12: Self = Self::from_bytes(*b"NV12");

    /// Packs four characters into a fourcc code.
    #[inline]
    #[must_use]
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self((b[0] as u32) | (b[1] as u32) << 8 | (b[2] as u32) << 16 | (b[3] as u32) << 24)
    }

    /// Returns the four characters of this code.
    #[inline]
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Whether the sampled channel order differs from what the compositing
    /// program expects, so an alternate program must swap red and blue.
    #[inline]
    #[must_use]
    pub const fn needs_channel_swap(self) -> bool {
        self.0 == Self::ARGB.0
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(u8::is_ascii_graphic) {
            write!(
                f,
                "FourCc({}{}{}{})",
                bytes[0] as char, bytes[1] as char, bytes[2] as char, bytes[3] as char
            )
        } else {
            write!(f, "FourCc({:#010x})", self.0)
        }
    }
}
