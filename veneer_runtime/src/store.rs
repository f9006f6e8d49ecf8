// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-plane shared state between ingestion workers and the composer.
//!
//! Each [`PlaneSlot`] has exactly one writer (its ingestion worker) and one
//! reader (the frame composer). Scalars the composer polls every iteration
//! are atomics. Configuration updates go through a single-slot mailbox:
//! the writer merges into whatever is still pending, and the composer takes
//! the whole update at once with `try_lock`, so it never waits behind a
//! writer. A contended mailbox is simply picked up on the next iteration,
//! which is at most one frame of staleness.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use veneer_core::geometry::{Quad, output_quad};
use veneer_core::plane::{
    OutputRect, PlaneDescriptor, PlaneId, PlaneInput, PlaneKind, PlaneRole,
};

/// A new input description, with the moment it arrived.
#[derive(Clone, Debug, PartialEq)]
pub struct InputUpdate {
    /// Source description.
    pub input: PlaneInput,
    /// When the ingestion worker published it.
    pub received_at: Instant,
}

/// A new output placement with its precomputed vertex quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputUpdate {
    /// Placement in normalized device coordinates.
    pub rect: OutputRect,
    /// Quad computed from `rect`.
    pub vertices: Quad,
}

/// Changes not yet applied by the composer.
///
/// `input` and `output` are edge triggers: an input update means resources
/// must be recreated, an output update means the vertices changed. `role`
/// comes with every configuration record and applies as soon as it is taken.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingUpdate {
    /// New input description, if any.
    pub input: Option<InputUpdate>,
    /// New output placement, if any.
    pub output: Option<OutputUpdate>,
    /// Blend mode or overlay order from the latest record.
    pub role: Option<PlaneRole>,
}

impl PendingUpdate {
    /// Builds the update a descriptor carries, computing vertices for a new
    /// output right away.
    #[must_use]
    pub fn from_descriptor(desc: PlaneDescriptor, now: Instant) -> Self {
        let output = desc.output_valid.then(|| OutputUpdate {
            rect: desc.output,
            vertices: output_quad(&desc.output),
        });
        let input = desc.input_valid.then(|| InputUpdate {
            input: desc.input,
            received_at: now,
        });
        Self {
            input,
            output,
            role: Some(desc.role),
        }
    }

    /// Folds a newer update on top of this one. Newer parts win; parts the
    /// newer update does not carry are kept.
    #[must_use]
    pub fn merge(self, newer: Self) -> Self {
        Self {
            input: newer.input.or(self.input),
            output: newer.output.or(self.output),
            role: newer.role.or(self.role),
        }
    }
}

/// Shared state for one plane.
#[derive(Debug)]
pub struct PlaneSlot {
    id: PlaneId,
    enabled: AtomicBool,
    data_index: AtomicU32,
    frame_ready: AtomicBool,
    pending: Mutex<Option<PendingUpdate>>,
}

impl PlaneSlot {
    fn new(id: PlaneId) -> Self {
        Self {
            id,
            enabled: AtomicBool::new(false),
            data_index: AtomicU32::new(0),
            frame_ready: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }

    /// Which plane this slot holds.
    #[must_use]
    pub fn id(&self) -> PlaneId {
        self.id
    }

    // -- writer side ------------------------------------------------------

    /// Applies a configuration record.
    ///
    /// The mailbox is written before `enabled` is released, so a composer
    /// that sees the plane enabled also sees the update (or finds the
    /// mailbox busy and retries next iteration).
    pub fn publish(&self, desc: PlaneDescriptor, now: Instant) {
        let enabled = desc.enabled;
        let update = PendingUpdate::from_descriptor(desc, now);
        {
            let mut slot = self.pending.lock();
            let merged = match slot.take() {
                Some(older) => older.merge(update),
                None => update,
            };
            *slot = Some(merged);
        }
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Records that buffer `index` is ready for display.
    pub fn set_data_index(&self, index: u32) {
        self.data_index.store(index, Ordering::Release);
        self.frame_ready.store(true, Ordering::Release);
    }

    /// Disables the plane after a disconnect or close.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        self.frame_ready.store(false, Ordering::Release);
    }

    // -- reader side ------------------------------------------------------

    /// Whether the producer wants the plane composited.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Buffer most recently announced by a data record.
    #[must_use]
    pub fn data_index(&self) -> u32 {
        self.data_index.load(Ordering::Acquire)
    }

    /// Whether a data record arrived since the plane was last disabled.
    #[must_use]
    pub fn frame_ready(&self) -> bool {
        self.frame_ready.load(Ordering::Acquire)
    }

    /// Takes the pending update, if there is one and the writer is not
    /// holding the mailbox.
    pub fn take_pending(&self) -> Option<PendingUpdate> {
        self.pending.try_lock()?.take()
    }
}

/// Fixed set of plane slots, allocated once at startup.
#[derive(Debug)]
pub struct PlaneStateStore {
    graphics: Box<[PlaneSlot]>,
    video: Box<[PlaneSlot]>,
}

impl PlaneStateStore {
    /// Creates disabled slots for the given plane counts.
    ///
    /// # Panics
    ///
    /// Panics if a count exceeds its plane-kind maximum.
    #[must_use]
    pub fn new(graphics_planes: usize, video_planes: usize) -> Self {
        Self {
            graphics: (0..graphics_planes).map(|i| PlaneSlot::new(PlaneId::graphics(i))).collect(),
            video: (0..video_planes).map(|i| PlaneSlot::new(PlaneId::video(i))).collect(),
        }
    }

    /// Slot for `id`, if that plane is configured.
    #[must_use]
    pub fn slot(&self, id: PlaneId) -> Option<&PlaneSlot> {
        match id.kind() {
            PlaneKind::Graphics => self.graphics.get(id.index()),
            PlaneKind::Video => self.video.get(id.index()),
        }
    }

    /// Graphics slots in index order.
    #[must_use]
    pub fn graphics(&self) -> &[PlaneSlot] {
        &self.graphics
    }

    /// Video slots in index order.
    #[must_use]
    pub fn video(&self) -> &[PlaneSlot] {
        &self.video
    }

    /// All slots, graphics first.
    pub fn iter(&self) -> impl Iterator<Item = &PlaneSlot> {
        self.graphics.iter().chain(self.video.iter())
    }
}
