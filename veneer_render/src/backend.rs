// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU backend contract.
//!
//! The compositor needs very little from the GPU: textures bound to
//! streaming devices, two fragment programs, a rotation uniform, scoped blend
//! state, and quad draws. Binding mechanics (contexts, surfaces, shader
//! sources) are the implementor's business.

use veneer_core::geometry::Quad;
use veneer_core::plane::BlendMode;

use crate::error::DeviceError;
use crate::plan::{ProgramKind, RenderPlan};
use crate::resource::{DeviceHandle, TextureId};

/// The GPU operations the frame composer issues.
///
/// All calls happen on the render thread.
pub trait GpuBackend {
    /// Allocates a nearest-filtered texture sourced from `device`'s
    /// streaming buffers.
    fn create_texture(&mut self, device: DeviceHandle) -> Result<TextureId, DeviceError>;

    /// Frees a texture.
    fn delete_texture(&mut self, texture: TextureId);

    /// Selects the fragment program for subsequent draws.
    fn use_program(&mut self, program: ProgramKind);

    /// Sets the column-major rotation uniform.
    fn set_transform(&mut self, cols: &[f32; 16]);

    /// Binds `texture` and selects `buffer_index` of `device` as its source.
    fn bind_stream(&mut self, texture: TextureId, device: DeviceHandle, buffer_index: u32);

    /// Enables blending for the next draw. Never called with
    /// [`BlendMode::Opaque`].
    fn enable_blend(&mut self, blend: BlendMode);

    /// Disables blending.
    fn disable_blend(&mut self);

    /// Draws two triangles.
    fn draw_quad(&mut self, vertices: &Quad, texcoords: &Quad);

    /// Clears the back buffer.
    fn clear(&mut self);

    /// Presents the back buffer.
    fn present(&mut self) -> Result<(), DeviceError>;

    /// Releases programs and the display surface. Called once at shutdown,
    /// after every texture has been deleted.
    fn release(&mut self);
}

/// Issues every draw of `plan` in order.
///
/// Blend state is enabled only around the draw that asks for it and
/// disabled right after, so no draw inherits another's blending.
pub fn submit_plan<B: GpuBackend + ?Sized>(backend: &mut B, plan: &RenderPlan) {
    for item in &plan.items {
        backend.use_program(item.program);
        backend.set_transform(&item.transform);
        backend.bind_stream(item.texture, item.device, item.buffer_index);
        let blended = item.blend != BlendMode::Opaque;
        if blended {
            backend.enable_blend(item.blend);
        }
        backend.draw_quad(&item.vertices, &item.texcoords);
        if blended {
            backend.disable_blend();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::DrawItem;
    use crate::software::{GpuCall, RecordingBackend};
    use veneer_core::geometry::output_quad;
    use veneer_core::plane::{OutputRect, PlaneId, Tier};
    use veneer_core::transform::Transform3d;

    fn item(plane: PlaneId, tier: Tier, blend: BlendMode) -> DrawItem {
        DrawItem {
            plane,
            tier,
            texture: TextureId(1),
            device: DeviceHandle(0),
            buffer_index: 0,
            program: ProgramKind::Passthrough,
            blend,
            transform: Transform3d::IDENTITY.to_cols_array_f32(),
            vertices: output_quad(&OutputRect::FULLSCREEN),
            texcoords: output_quad(&OutputRect::FULLSCREEN),
        }
    }

    #[test]
    fn blend_is_scoped_to_one_draw() {
        let mut plan = RenderPlan::new();
        plan.push(item(PlaneId::graphics(0), Tier::Graphics, BlendMode::PixelAlpha));
        plan.push(item(PlaneId::graphics(1), Tier::Graphics, BlendMode::Opaque));
        let mut backend = RecordingBackend::new();
        submit_plan(&mut backend, &plan);

        let blend_calls: alloc::vec::Vec<_> = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, GpuCall::EnableBlend(_) | GpuCall::DisableBlend | GpuCall::Draw { .. }))
            .cloned()
            .collect();
        assert_eq!(blend_calls.len(), 4);
        assert_eq!(blend_calls[0], GpuCall::EnableBlend(BlendMode::PixelAlpha));
        assert!(matches!(blend_calls[1], GpuCall::Draw { .. }), "blended draw sits inside the scope");
        assert_eq!(blend_calls[2], GpuCall::DisableBlend);
        assert!(matches!(blend_calls[3], GpuCall::Draw { .. }), "opaque draw has no blend calls");
    }

    #[test]
    fn empty_plan_issues_nothing() {
        let mut backend = RecordingBackend::new();
        submit_plan(&mut backend, &RenderPlan::new());
        assert!(backend.calls().is_empty(), "no clear or present either");
    }
}
