// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use veneer_core::plane::{PlaneState, Tier};
use veneer_core::trace::{
    DrawEvent, FrameBeginEvent, FrameRateEvent, IdleEvent, PlaneTransitionEvent, PresentEvent,
    RecreateEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    show_idle: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("show_idle", &self.show_idle)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            show_idle: false,
        }
    }

    /// Also print idle iterations. Off by default; an idle compositor
    /// iterates every few milliseconds.
    #[must_use]
    pub fn show_idle(mut self, show: bool) -> Self {
        self.show_idle = show;
        self
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn state_name(state: PlaneState) -> &'static str {
    match state {
        PlaneState::Disabled => "disabled",
        PlaneState::PendingInput => "pending",
        PlaneState::Ready => "ready",
    }
}

fn tier_name(tier: Tier) -> &'static str {
    match tier {
        Tier::UnderVideo => "under",
        Tier::Graphics => "gfx",
        Tier::OverVideo => "over",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        if e.active_planes == 0 && !self.show_idle {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[frame] frame={} active={}",
            e.frame_index, e.active_planes,
        );
    }

    fn on_plane_transition(&mut self, e: &PlaneTransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[plane] frame={} {} {} -> {}",
            e.frame_index,
            e.plane,
            state_name(e.from),
            state_name(e.to),
        );
    }

    fn on_recreate(&mut self, e: &RecreateEvent) {
        let _ = writeln!(
            self.writer,
            "[recreate] frame={} {} device={} texture={} buffers={} format={:?}",
            e.frame_index, e.plane, e.device, e.texture, e.buffer_count, e.format,
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] frame={} {} tier={} buffer={}",
            e.frame_index,
            e.plane,
            tier_name(e.tier),
            e.buffer_index,
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        let _ = writeln!(self.writer, "[present] frame={} drawn={}", e.frame_index, e.drawn);
    }

    fn on_idle(&mut self, e: &IdleEvent) {
        if self.show_idle {
            let _ = writeln!(self.writer, "[idle] frame={}", e.frame_index);
        }
    }

    fn on_frame_rate(&mut self, e: &FrameRateEvent) {
        let _ = writeln!(
            self.writer,
            "[fps] {} frames in {}ms = {} fps",
            e.frames, e.elapsed_ms, e.fps,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_core::format::FourCc;
    use veneer_core::plane::PlaneId;

    #[test]
    fn pretty_print_recreate() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_recreate(&RecreateEvent {
            frame_index: 3,
            plane: PlaneId::video(1),
            device: 2,
            texture: 5,
            buffer_count: 3,
            format: FourCc::UYVY,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[recreate] frame=3 vid1"), "got: {output}");
        assert!(output.contains("format=FourCc(UYVY)"), "got: {output}");
    }

    #[test]
    fn idle_is_quiet_unless_asked() {
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            active_planes: 0,
        });
        quiet.on_idle(&IdleEvent { frame_index: 0 });
        assert!(quiet.into_inner().is_empty(), "idle frames are skipped");

        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new()).show_idle(true);
        loud.on_idle(&IdleEvent { frame_index: 9 });
        assert_eq!(String::from_utf8(loud.into_inner()).unwrap(), "[idle] frame=9\n");
    }

    #[test]
    fn transitions_name_both_states() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_plane_transition(&PlaneTransitionEvent {
            frame_index: 1,
            plane: PlaneId::graphics(0),
            from: PlaneState::PendingInput,
            to: PlaneState::Ready,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[plane] frame=1 gfx0 pending -> ready\n");
    }
}
