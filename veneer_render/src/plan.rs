// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of plane draws for one frame.

use alloc::vec::Vec;

use veneer_core::geometry::Quad;
use veneer_core::plane::{BlendMode, PlaneId, Tier};

use crate::resource::{DeviceHandle, TextureId};

/// Which fragment program samples the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Samples the texture as-is.
    #[default]
    Passthrough,
    /// Swaps red and blue while sampling.
    SwapRedBlue,
}

/// A single plane draw.
#[derive(Clone, Debug)]
pub struct DrawItem {
    /// The plane this draw originates from.
    pub plane: PlaneId,
    /// Compositing tier.
    pub tier: Tier,
    /// Texture bound to the plane's device.
    pub texture: TextureId,
    /// Device streaming into `texture`.
    pub device: DeviceHandle,
    /// Buffer of the device's ring to sample.
    pub buffer_index: u32,
    /// Program to draw with.
    pub program: ProgramKind,
    /// Blend state scoped to this draw.
    pub blend: BlendMode,
    /// Rotation (column-major 4x4).
    pub transform: [f32; 16],
    /// Output quad in normalized device coordinates.
    pub vertices: Quad,
    /// Texture coordinate quad.
    pub texcoords: Quad,
}

/// An ordered list of draws for a single frame.
///
/// Items are kept in back-to-front order: under-video, graphics, over-video,
/// and plane-index order within each tier.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Draws in back-to-front order.
    pub items: Vec<DrawItem>,
}

impl RenderPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Appends a draw.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `item` would break tier order.
    pub fn push(&mut self, item: DrawItem) {
        debug_assert!(
            self.items.last().is_none_or(|last| last.tier <= item.tier),
            "draws must be pushed in tier order"
        );
        self.items.push(item);
    }

    /// Number of draws.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the plan draws nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
