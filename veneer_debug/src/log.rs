// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding trace events into `tracing`.

use veneer_core::trace::{
    DrawEvent, FrameBeginEvent, FrameRateEvent, IdleEvent, PlaneTransitionEvent, PresentEvent,
    RecreateEvent, TraceSink,
};

/// A [`TraceSink`] that re-emits every event as a `tracing` event under the
/// `veneer::frame` target.
///
/// Per-frame events go out at `TRACE`, state changes and recreation at
/// `DEBUG`, frame-rate reports at `INFO`. Filter with e.g.
/// `RUST_LOG=veneer::frame=debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        tracing::trace!(target: "veneer::frame", frame = e.frame_index, active = e.active_planes, "frame begin");
    }

    fn on_plane_transition(&mut self, e: &PlaneTransitionEvent) {
        tracing::debug!(
            target: "veneer::frame",
            frame = e.frame_index,
            plane = %e.plane,
            from = ?e.from,
            to = ?e.to,
            "plane transition"
        );
    }

    fn on_recreate(&mut self, e: &RecreateEvent) {
        tracing::debug!(
            target: "veneer::frame",
            frame = e.frame_index,
            plane = %e.plane,
            device = e.device,
            texture = e.texture,
            buffers = e.buffer_count,
            format = ?e.format,
            "recreate"
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        tracing::trace!(
            target: "veneer::frame",
            frame = e.frame_index,
            plane = %e.plane,
            tier = ?e.tier,
            buffer = e.buffer_index,
            "draw"
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        tracing::trace!(target: "veneer::frame", frame = e.frame_index, drawn = e.drawn, "present");
    }

    fn on_idle(&mut self, e: &IdleEvent) {
        tracing::trace!(target: "veneer::frame", frame = e.frame_index, "idle");
    }

    fn on_frame_rate(&mut self, e: &FrameRateEvent) {
        tracing::info!(
            target: "veneer::frame",
            frames = e.frames,
            elapsed_ms = e.elapsed_ms,
            fps = e.fps,
            "frame rate"
        );
    }
}
