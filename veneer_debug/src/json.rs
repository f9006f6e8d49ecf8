// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events.
//!
//! [`export`] writes a complete JSON array with one object per
//! [`RecordedEvent`]. Every object carries an `"event"` name; all but frame-rate
//! reports carry a `"frame"` index.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

/// Converts one event to a JSON object.
#[must_use]
pub fn event_to_value(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::FrameBegin(e) => json!({
            "event": "frame_begin",
            "frame": e.frame_index,
            "active_planes": e.active_planes,
        }),
        RecordedEvent::PlaneTransition(e) => json!({
            "event": "plane_transition",
            "frame": e.frame_index,
            "plane": e.plane.to_string(),
            "from": format!("{:?}", e.from),
            "to": format!("{:?}", e.to),
        }),
        RecordedEvent::Recreate(e) => json!({
            "event": "recreate",
            "frame": e.frame_index,
            "plane": e.plane.to_string(),
            "device": e.device,
            "texture": e.texture,
            "buffers": e.buffer_count,
            "fourcc": String::from_utf8_lossy(&e.format.to_bytes()),
        }),
        RecordedEvent::Draw(e) => json!({
            "event": "draw",
            "frame": e.frame_index,
            "plane": e.plane.to_string(),
            "tier": format!("{:?}", e.tier),
            "buffer": e.buffer_index,
        }),
        RecordedEvent::Present(e) => json!({
            "event": "present",
            "frame": e.frame_index,
            "drawn": e.drawn,
        }),
        RecordedEvent::Idle(e) => json!({
            "event": "idle",
            "frame": e.frame_index,
        }),
        RecordedEvent::FrameRate(e) => json!({
            "event": "frame_rate",
            "frames": e.frames,
            "elapsed_ms": e.elapsed_ms,
            "fps": e.fps,
        }),
    }
}

/// Writes `events` to `writer` as a pretty-printed JSON array.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let array = Value::Array(events.iter().map(event_to_value).collect());
    serde_json::to_writer_pretty(&mut *writer, &array)?;
    writeln!(writer)
}
