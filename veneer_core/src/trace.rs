// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! frame composer calls at each stage of an iteration. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::format::FourCc;
use crate::plane::{PlaneId, PlaneState, Tier};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of every composer iteration, after pending updates
/// have been applied.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic iteration counter.
    pub frame_index: u64,
    /// Planes enabled and fully configured this iteration.
    pub active_planes: u32,
}

/// Emitted when a plane changes lifecycle state.
#[derive(Clone, Copy, Debug)]
pub struct PlaneTransitionEvent {
    /// Iteration counter.
    pub frame_index: u64,
    /// Which plane.
    pub plane: PlaneId,
    /// Previous state.
    pub from: PlaneState,
    /// New state.
    pub to: PlaneState,
}

/// Emitted after a plane's device and texture were (re)created.
#[derive(Clone, Copy, Debug)]
pub struct RecreateEvent {
    /// Iteration counter.
    pub frame_index: u64,
    /// Which plane.
    pub plane: PlaneId,
    /// Raw streaming-device slot.
    pub device: u32,
    /// Raw texture id.
    pub texture: u32,
    /// Buffers bound to the device.
    pub buffer_count: u32,
    /// Source format.
    pub format: FourCc,
}

/// Emitted for each plane draw.
#[derive(Clone, Copy, Debug)]
pub struct DrawEvent {
    /// Iteration counter.
    pub frame_index: u64,
    /// Which plane.
    pub plane: PlaneId,
    /// Tier the plane was drawn in.
    pub tier: Tier,
    /// Buffer sampled.
    pub buffer_index: u32,
}

/// Emitted when a composed frame is presented.
#[derive(Clone, Copy, Debug)]
pub struct PresentEvent {
    /// Iteration counter.
    pub frame_index: u64,
    /// Planes drawn into the frame.
    pub drawn: u32,
}

/// Emitted when an iteration had nothing to draw.
#[derive(Clone, Copy, Debug)]
pub struct IdleEvent {
    /// Iteration counter.
    pub frame_index: u64,
}

/// Periodic frame-rate report.
#[derive(Clone, Copy, Debug)]
pub struct FrameRateEvent {
    /// Frames in the measured window.
    pub frames: u32,
    /// Wall-clock length of the window in milliseconds.
    pub elapsed_ms: u64,
    /// `frames * 1000 / elapsed_ms`.
    pub fps: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of an iteration.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a plane changes state.
    fn on_plane_transition(&mut self, e: &PlaneTransitionEvent) {
        _ = e;
    }

    /// Called after resources were recreated.
    fn on_recreate(&mut self, e: &RecreateEvent) {
        _ = e;
    }

    /// Called per plane draw.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called when a frame is presented.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called when an iteration idles.
    fn on_idle(&mut self, e: &IdleEvent) {
        _ = e;
    }

    /// Called with a frame-rate report.
    fn on_frame_rate(&mut self, e: &FrameRateEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta] $name:ident => $method:ident($ty:ty);)*) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self, e: &$ty) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$method(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch! {
        /// Emits a [`FrameBeginEvent`].
        frame_begin => on_frame_begin(FrameBeginEvent);
        /// Emits a [`PlaneTransitionEvent`].
        plane_transition => on_plane_transition(PlaneTransitionEvent);
        /// Emits a [`RecreateEvent`].
        recreate => on_recreate(RecreateEvent);
        /// Emits a [`DrawEvent`].
        draw => on_draw(DrawEvent);
        /// Emits a [`PresentEvent`].
        present => on_present(PresentEvent);
        /// Emits an [`IdleEvent`].
        idle => on_idle(IdleEvent);
        /// Emits a [`FrameRateEvent`].
        frame_rate => on_frame_rate(FrameRateEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        presents: u32,
        idles: u32,
    }

    impl TraceSink for Counter {
        fn on_present(&mut self, _e: &PresentEvent) {
            self.presents += 1;
        }

        fn on_idle(&mut self, _e: &IdleEvent) {
            self.idles += 1;
        }
    }

    #[test]
    fn none_tracer_accepts_events() {
        let mut t = Tracer::none();
        t.idle(&IdleEvent { frame_index: 0 });
        t.present(&PresentEvent {
            frame_index: 0,
            drawn: 1,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = Counter::default();
        {
            let mut t = Tracer::new(&mut sink);
            t.idle(&IdleEvent { frame_index: 0 });
            t.present(&PresentEvent {
                frame_index: 1,
                drawn: 2,
            });
            t.present(&PresentEvent {
                frame_index: 2,
                drawn: 2,
            });
        }
        assert_eq!(sink.idles, 1);
        assert_eq!(sink.presents, 2);
    }

    #[test]
    fn noop_sink_ignores_everything() {
        let mut sink = NoopSink;
        sink.on_frame_rate(&FrameRateEvent {
            frames: 1000,
            elapsed_ms: 16_667,
            fps: 59,
        });
        let mut counter = Counter::default();
        counter.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            active_planes: 0,
        });
        assert_eq!(counter.presents + counter.idles, 0);
    }
}
