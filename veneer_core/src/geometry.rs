// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Six-vertex quads for plane placement and sampling.
//!
//! Every plane is drawn as two triangles. The vertex order is fixed and the
//! texture coordinate quad uses the same corner order, so vertex `i` always
//! samples texel corner `i`:
//!
//! ```text
//!   0 ──── 2,3
//!   │  ╲    │
//!   1,4 ── 5
//! ```

use bytemuck::{Pod, Zeroable};

use crate::error::{Axis, ConfigError};
use crate::plane::{CropRect, OutputRect};

/// One 2-D vertex or texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vertex {
    /// Creates a vertex.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Two triangles covering one rectangle.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Quad(pub [Vertex; 6]);

impl Quad {
    /// Builds a quad from its left, right, top, and bottom edges.
    #[inline]
    #[must_use]
    pub const fn from_edges(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self([
            Vertex::new(left, top),
            Vertex::new(left, bottom),
            Vertex::new(right, top),
            Vertex::new(right, top),
            Vertex::new(left, bottom),
            Vertex::new(right, bottom),
        ])
    }

    /// The vertices as a flat `[x0, y0, x1, y1, ...]` slice.
    #[inline]
    #[must_use]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.0)
    }
}

/// Vertex quad for an output rectangle in normalized device coordinates.
///
/// Pure function of the rectangle; the quad spans `x..x+width` horizontally
/// and `y-height..y` vertically.
#[must_use]
pub fn output_quad(rect: &OutputRect) -> Quad {
    Quad::from_edges(rect.x, rect.x + rect.width, rect.y, rect.y - rect.height)
}

/// Resolves a crop against the source dimensions.
///
/// A zero crop width or height selects the full source extent on that axis.
/// Fails if the crop reaches past the source on either axis.
pub fn resolve_crop(crop: &CropRect, width: u32, height: u32) -> Result<CropRect, ConfigError> {
    let resolved = CropRect {
        x: crop.x,
        y: crop.y,
        width: if crop.width == 0 { width } else { crop.width },
        height: if crop.height == 0 { height } else { crop.height },
    };
    check_axis(Axis::Horizontal, resolved.x, resolved.width, width)?;
    check_axis(Axis::Vertical, resolved.y, resolved.height, height)?;
    Ok(resolved)
}

fn check_axis(axis: Axis, offset: u32, extent: u32, limit: u32) -> Result<(), ConfigError> {
    match offset.checked_add(extent) {
        Some(end) if end <= limit => Ok(()),
        _ => Err(ConfigError::CropOutOfBounds {
            axis,
            offset,
            extent,
            limit,
        }),
    }
}

/// Texture coordinate quad selecting `crop` out of a `width`×`height` source.
///
/// Coordinates are normalized to `[0, 1]`, with `v` growing downward through
/// the source so vertex 0 (top-left on screen) samples the crop's top-left.
pub fn texcoord_quad(crop: &CropRect, width: u32, height: u32) -> Result<Quad, ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptySource { width, height });
    }
    let c = resolve_crop(crop, width, height)?;
    let (w, h) = (width as f32, height as f32);
    let u0 = c.x as f32 / w;
    let v0 = c.y as f32 / h;
    let u1 = u0 + c.width as f32 / w;
    let v1 = v0 + c.height as f32 / h;
    // Bottom of the screen quad samples the larger v.
    Ok(Quad::from_edges(u0, u1, v0, v1))
}
