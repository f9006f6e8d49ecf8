// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event in order as
//! a [`RecordedEvent`]. The log can be queried directly or exported with
//! [`json::export`](crate::json::export).

use veneer_core::plane::PlaneId;
use veneer_core::trace::{
    DrawEvent, FrameBeginEvent, FrameRateEvent, IdleEvent, PlaneTransitionEvent, PresentEvent,
    RecreateEvent, TraceSink,
};

/// One recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PlaneTransitionEvent`].
    PlaneTransition(PlaneTransitionEvent),
    /// A [`RecreateEvent`].
    Recreate(RecreateEvent),
    /// A [`DrawEvent`].
    Draw(DrawEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// An [`IdleEvent`].
    Idle(IdleEvent),
    /// A [`FrameRateEvent`].
    FrameRate(FrameRateEvent),
}

impl RecordedEvent {
    /// The iteration the event belongs to, if it has one.
    #[must_use]
    pub fn frame_index(&self) -> Option<u64> {
        match self {
            Self::FrameBegin(e) => Some(e.frame_index),
            Self::PlaneTransition(e) => Some(e.frame_index),
            Self::Recreate(e) => Some(e.frame_index),
            Self::Draw(e) => Some(e.frame_index),
            Self::Present(e) => Some(e.frame_index),
            Self::Idle(e) => Some(e.frame_index),
            Self::FrameRate(_) => None,
        }
    }
}

/// A [`TraceSink`] that keeps events in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// How many times `plane` had its resources recreated.
    #[must_use]
    pub fn recreations(&self, plane: PlaneId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Recreate(r) if r.plane == plane))
            .count()
    }

    /// Planes drawn in iteration `frame_index`, in draw order.
    #[must_use]
    pub fn draws_in_frame(&self, frame_index: u64) -> Vec<PlaneId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Draw(d) if d.frame_index == frame_index => Some(d.plane),
                _ => None,
            })
            .collect()
    }

    /// Frames presented.
    #[must_use]
    pub fn presents(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Present(_)))
            .count()
    }

    /// Iterations that drew nothing.
    #[must_use]
    pub fn idles(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Idle(_)))
            .count()
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.events.push(RecordedEvent::FrameBegin(*e));
    }

    fn on_plane_transition(&mut self, e: &PlaneTransitionEvent) {
        self.events.push(RecordedEvent::PlaneTransition(*e));
    }

    fn on_recreate(&mut self, e: &RecreateEvent) {
        self.events.push(RecordedEvent::Recreate(*e));
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.events.push(RecordedEvent::Draw(*e));
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.events.push(RecordedEvent::Present(*e));
    }

    fn on_idle(&mut self, e: &IdleEvent) {
        self.events.push(RecordedEvent::Idle(*e));
    }

    fn on_frame_rate(&mut self, e: &FrameRateEvent) {
        self.events.push(RecordedEvent::FrameRate(*e));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;
    use veneer_core::format::FourCc;
    use veneer_core::plane::{
        BlendMode, CropRect, OutputRect, OverlayOrder, PhysAddr, PlaneDescriptor, PlaneInput,
        PlaneRole, PlaneState,
    };
    use veneer_core::trace::Tracer;
    use veneer_render::{RecordingBackend, SoftwareDriver};
    use veneer_runtime::{CompositorConfig, FrameComposer, PlaneStateStore};

    fn descriptor(role: PlaneRole, buffers: usize) -> PlaneDescriptor {
        PlaneDescriptor {
            enabled: true,
            input_valid: true,
            input: PlaneInput {
                buffers: (0..buffers as u64).map(|i| PhysAddr(0x7000_0000 + (i << 20))).collect(),
                width: 320,
                height: 240,
                format: FourCc::UYVY,
                rotation_degrees: 90.0,
                crop: CropRect::default(),
            },
            output_valid: true,
            output: OutputRect::FULLSCREEN,
            role,
        }
    }

    #[test]
    fn records_a_composed_session() {
        let store = Arc::new(PlaneStateStore::new(1, 1));
        let mut composer = FrameComposer::new(
            store.clone(),
            RecordingBackend::new(),
            SoftwareDriver::new(),
            &CompositorConfig::default(),
        );
        let mut rec = RecorderSink::new();

        composer.step(Instant::now(), &mut Tracer::new(&mut rec)).unwrap();

        let video = PlaneId::video(0);
        let gfx = PlaneId::graphics(0);
        store.video()[0].publish(
            descriptor(
                PlaneRole::Video {
                    overlay: OverlayOrder::OverGraphics,
                },
                2,
            ),
            Instant::now(),
        );
        store.video()[0].set_data_index(1);
        store.graphics()[0].publish(
            descriptor(
                PlaneRole::Graphics {
                    blend: BlendMode::PixelAlpha,
                },
                1,
            ),
            Instant::now(),
        );
        for _ in 0..3 {
            composer.step(Instant::now(), &mut Tracer::new(&mut rec)).unwrap();
        }

        assert_eq!(rec.idles(), 1);
        assert_eq!(rec.presents(), 3);
        assert_eq!(rec.recreations(video), 1, "data records never recreate");
        assert_eq!(rec.recreations(gfx), 1);
        assert_eq!(rec.draws_in_frame(1), [gfx, video], "over-video draws last");

        let became_ready = rec
            .events()
            .iter()
            .filter(|e| matches!(e, RecordedEvent::PlaneTransition(t) if t.to == PlaneState::Ready))
            .count();
        assert_eq!(became_ready, 2);
    }

    #[test]
    fn frame_rate_has_no_frame_index() {
        let e = RecordedEvent::FrameRate(FrameRateEvent {
            frames: 10,
            elapsed_ms: 100,
            fps: 100,
        });
        assert_eq!(e.frame_index(), None);
        assert_eq!(RecordedEvent::Idle(IdleEvent { frame_index: 4 }).frame_index(), Some(4));
    }
}
