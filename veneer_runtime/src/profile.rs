// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic frame-rate measurement.

use std::time::Instant;

use veneer_core::trace::FrameRateEvent;

/// Counts presented frames and reports the rate every `interval` frames.
#[derive(Clone, Debug)]
pub struct FrameRateMeter {
    interval: u32,
    frames: u32,
    window_start: Instant,
}

impl FrameRateMeter {
    /// Starts a measurement window at `now`.
    ///
    /// An `interval` of zero is treated as one.
    #[must_use]
    pub fn new(interval: u32, now: Instant) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
            window_start: now,
        }
    }

    /// Counts one presented frame. Every `interval` frames, returns the rate
    /// over the window and starts a new one.
    pub fn record_frame(&mut self, now: Instant) -> Option<FrameRateEvent> {
        self.frames += 1;
        if self.frames < self.interval {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.window_start);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let event = FrameRateEvent {
            frames: self.frames,
            elapsed_ms,
            fps: u64::from(self.frames) * 1000 / elapsed_ms.max(1),
        };
        self.frames = 0;
        self.window_start = now;
        Some(event)
    }
}
