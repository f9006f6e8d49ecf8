// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plane identifiers, descriptors, and lifecycle.
//!
//! A *plane* is one independently configured layer of the output: either a
//! graphics plane (single buffer, optional blending) or a video plane (a ring
//! of up to [`MAX_VIDEO_BUFFERS`] buffers, drawn under or over the graphics
//! tier). Both kinds share the same capability set (an enable flag, an input
//! description, and an output description) so the render side handles them
//! uniformly; kind-specific parts live in [`PlaneRole`].

use alloc::vec::Vec;
use core::fmt;

use crate::error::ConfigError;
use crate::format::FourCc;

/// Number of graphics planes the compositor services.
pub const MAX_GRAPHICS_PLANES: usize = 4;

/// Number of video planes the compositor services.
pub const MAX_VIDEO_PLANES: usize = 4;

/// Maximum number of buffers in one video channel's ring.
pub const MAX_VIDEO_BUFFERS: usize = 16;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Which kind of plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    /// Single-buffer graphics plane.
    Graphics,
    /// Multi-buffer video plane.
    Video,
}

/// Identifies one plane: its kind plus its index within that kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneId {
    kind: PlaneKind,
    index: u8,
}

impl PlaneId {
    /// Graphics plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= MAX_GRAPHICS_PLANES`.
    #[must_use]
    pub const fn graphics(index: usize) -> Self {
        assert!(index < MAX_GRAPHICS_PLANES, "graphics plane index out of range");
        #[expect(clippy::cast_possible_truncation, reason = "bounded by the assert above")]
        let index = index as u8;
        Self {
            kind: PlaneKind::Graphics,
            index,
        }
    }

    /// Video plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= MAX_VIDEO_PLANES`.
    #[must_use]
    pub const fn video(index: usize) -> Self {
        assert!(index < MAX_VIDEO_PLANES, "video plane index out of range");
        #[expect(clippy::cast_possible_truncation, reason = "bounded by the assert above")]
        let index = index as u8;
        Self {
            kind: PlaneKind::Video,
            index,
        }
    }

    /// The plane kind.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> PlaneKind {
        self.kind
    }

    /// Index within the plane kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PlaneKind::Graphics => write!(f, "gfx{}", self.index),
            PlaneKind::Video => write!(f, "vid{}", self.index),
        }
    }
}

// ---------------------------------------------------------------------------
// Input / output descriptions
// ---------------------------------------------------------------------------

/// Physical address of a producer-owned pixel buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysAddr(pub u64);

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}

/// Source crop rectangle in source pixels.
///
/// A zero `width` or `height` means "the whole source extent on that axis".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width, or 0 for the full source width.
    pub width: u32,
    /// Height, or 0 for the full source height.
    pub height: u32,
}

/// Output placement in normalized device coordinates.
///
/// `(x, y)` is the top-left corner; `y` grows upward, so the quad extends to
/// `y - height`. The full screen is `(-1, 1, 2, 2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl OutputRect {
    /// The whole output surface.
    pub const FULLSCREEN: Self = Self {
        x: -1.0,
        y: 1.0,
        width: 2.0,
        height: 2.0,
    };

    /// Is every component [finite]?
    ///
    /// [finite]: f32::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for OutputRect {
    fn default() -> Self {
        Self::FULLSCREEN
    }
}

/// Source surface description.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneInput {
    /// Buffer ring. Graphics planes carry exactly one buffer.
    pub buffers: Vec<PhysAddr>,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: FourCc,
    /// Rotation about the screen normal, in degrees.
    pub rotation_degrees: f32,
    /// Source crop.
    pub crop: CropRect,
}

impl PlaneInput {
    /// Number of buffers in the ring.
    #[inline]
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Checks the parts of the description that the render side cannot
    /// recover from: buffer count bounds, an empty source, and a non-finite
    /// rotation. Crop bounds are checked where texture coordinates are built.
    pub fn validate(&self, max_buffers: usize) -> Result<(), ConfigError> {
        if self.buffers.is_empty() {
            return Err(ConfigError::NoBuffers);
        }
        if self.buffers.len() > max_buffers {
            return Err(ConfigError::TooManyBuffers {
                count: u32::try_from(self.buffers.len()).unwrap_or(u32::MAX),
                max: max_buffers,
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptySource {
                width: self.width,
                height: self.height,
            });
        }
        if !self.rotation_degrees.is_finite() {
            return Err(ConfigError::NonFinite { field: "rotate" });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// How a graphics plane blends onto what is below it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BlendMode {
    /// Blending disabled.
    #[default]
    Opaque,
    /// Source-alpha blending using each pixel's alpha.
    PixelAlpha,
    /// Constant-alpha blending with the given alpha in `[0, 1]`.
    GlobalAlpha(f32),
}

impl BlendMode {
    /// Builds the blend policy from the producer's flags.
    ///
    /// Global alpha wins over per-pixel alpha when both are enabled.
    #[must_use]
    pub fn from_flags(blending: bool, global_alpha_enabled: bool, global_alpha: f32) -> Self {
        match (blending, global_alpha_enabled) {
            (false, _) => Self::Opaque,
            (true, true) => Self::GlobalAlpha(global_alpha),
            (true, false) => Self::PixelAlpha,
        }
    }
}

/// Where a video plane sits relative to the graphics tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayOrder {
    /// Drawn before graphics planes.
    #[default]
    UnderGraphics,
    /// Drawn after graphics planes.
    OverGraphics,
}

/// Kind-specific part of a plane descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaneRole {
    /// Graphics plane with its blend policy.
    Graphics {
        /// Blend policy.
        blend: BlendMode,
    },
    /// Video plane with its tier placement.
    Video {
        /// Tier placement.
        overlay: OverlayOrder,
    },
}

impl PlaneRole {
    /// The plane kind this role belongs to.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PlaneKind {
        match self {
            Self::Graphics { .. } => PlaneKind::Graphics,
            Self::Video { .. } => PlaneKind::Video,
        }
    }
}

/// Draw tier, in back-to-front order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Video planes placed under graphics.
    UnderVideo,
    /// Graphics planes.
    Graphics,
    /// Video planes placed over graphics.
    OverVideo,
}

impl Tier {
    /// All tiers in draw order.
    pub const ORDER: [Self; 3] = [Self::UnderVideo, Self::Graphics, Self::OverVideo];
}

impl PlaneRole {
    /// The tier this plane draws in.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Graphics { .. } => Tier::Graphics,
            Self::Video {
                overlay: OverlayOrder::UnderGraphics,
            } => Tier::UnderVideo,
            Self::Video {
                overlay: OverlayOrder::OverGraphics,
            } => Tier::OverVideo,
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// A complete producer-supplied plane configuration.
///
/// `input_valid` and `output_valid` are edge triggers: they say whether this
/// update carries a new input or output description, not whether the plane
/// has one.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneDescriptor {
    /// Whether the plane should be composited.
    pub enabled: bool,
    /// This update carries a new input description.
    pub input_valid: bool,
    /// Source surface.
    pub input: PlaneInput,
    /// This update carries a new output description.
    pub output_valid: bool,
    /// Output placement.
    pub output: OutputRect,
    /// Kind-specific configuration.
    pub role: PlaneRole,
}

impl PlaneDescriptor {
    /// Checks the descriptor for unrecoverable misconfiguration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = match self.role.kind() {
            PlaneKind::Graphics => 1,
            PlaneKind::Video => MAX_VIDEO_BUFFERS,
        };
        self.input.validate(max)?;
        if !self.output.is_finite() {
            return Err(ConfigError::NonFinite { field: "output" });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Render-side lifecycle of one plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaneState {
    /// Not composited.
    #[default]
    Disabled,
    /// Enabled; an input description is waiting to be applied.
    PendingInput,
    /// Resources are current; the plane can be drawn.
    Ready,
}
