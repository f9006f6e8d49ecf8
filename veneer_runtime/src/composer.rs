// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame composer: one render-thread iteration at a time.
//!
//! Each [`FrameComposer::step`]:
//!
//! 1. Takes pending updates from every plane's mailbox. New output
//!    placements and blend or overlay settings apply right away.
//! 2. Recreates resources for video planes with a new input.
//! 3. Recreates resources for graphics planes with a new input once the
//!    settle delay (measured from when the input arrived) has passed.
//! 4. Counts planes that are enabled and drawable. With none, returns
//!    [`FrameOutcome::Idle`] without clearing or presenting.
//! 5. Otherwise clears, draws under-video, graphics, then over-video planes
//!    in index order within each tier, and presents.
//!
//! Recreation runs before counting, so a plane that becomes ready in an
//! iteration is drawn in that same iteration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use veneer_core::format::FourCc;
use veneer_core::geometry::Quad;
use veneer_core::plane::{
    BlendMode, OverlayOrder, PlaneId, PlaneKind, PlaneRole, PlaneState, Tier,
};
use veneer_core::trace::{
    DrawEvent, FrameBeginEvent, IdleEvent, PlaneTransitionEvent, PresentEvent, RecreateEvent,
    Tracer,
};
use veneer_core::transform::Transform3d;
use veneer_render::{
    BufferTextureManager, DrawItem, GpuBackend, PlaneResources, ProgramKind, RenderPlan,
    StreamingDriver, submit_plan,
};

use crate::config::CompositorConfig;
use crate::error::RuntimeError;
use crate::profile::FrameRateMeter;
use crate::store::{PendingUpdate, PlaneSlot, PlaneStateStore};

/// Result of one composer iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was presented.
    Presented {
        /// Planes drawn into it.
        drawn: u32,
    },
    /// Nothing was drawable; nothing was cleared or presented.
    Idle,
}

/// Render-thread view of one plane.
#[derive(Debug)]
struct PlaneLocal {
    id: PlaneId,
    state: PlaneState,
    staged: PendingUpdate,
    resources: Option<PlaneResources>,
    role: PlaneRole,
    format: FourCc,
    vertices: Quad,
    transform: [f32; 16],
}

impl PlaneLocal {
    fn new(id: PlaneId) -> Self {
        let role = match id.kind() {
            PlaneKind::Graphics => PlaneRole::Graphics {
                blend: BlendMode::Opaque,
            },
            PlaneKind::Video => PlaneRole::Video {
                overlay: OverlayOrder::default(),
            },
        };
        Self {
            id,
            state: PlaneState::Disabled,
            staged: PendingUpdate::default(),
            resources: None,
            role,
            format: FourCc::default(),
            vertices: Quad::default(),
            transform: Transform3d::IDENTITY.to_cols_array_f32(),
        }
    }
}

/// Composites the planes of a [`PlaneStateStore`] through a [`GpuBackend`].
///
/// Owns every GPU-side resource; nothing here is touched by ingestion
/// threads.
#[derive(Debug)]
pub struct FrameComposer<B, D> {
    store: Arc<PlaneStateStore>,
    backend: B,
    textures: BufferTextureManager<D>,
    settle_delay: Duration,
    channel_swap: bool,
    graphics: Vec<PlaneLocal>,
    video: Vec<PlaneLocal>,
    plan: RenderPlan,
    frame_index: u64,
    meter: Option<FrameRateMeter>,
}

impl<B: GpuBackend, D: StreamingDriver> FrameComposer<B, D> {
    /// Creates a composer for every slot in `store`.
    #[must_use]
    pub fn new(store: Arc<PlaneStateStore>, backend: B, driver: D, config: &CompositorConfig) -> Self {
        let graphics = store.graphics().iter().map(|s| PlaneLocal::new(s.id())).collect();
        let video = store.video().iter().map(|s| PlaneLocal::new(s.id())).collect();
        Self {
            store,
            backend,
            textures: BufferTextureManager::new(driver, config.device_pool),
            settle_delay: config.settle_delay(),
            channel_swap: config.channel_swap,
            graphics,
            video,
            plan: RenderPlan::new(),
            frame_index: 0,
            meter: config
                .profiling
                .then_some(FrameRateMeter::new(config.profile_interval_frames, Instant::now())),
        }
    }

    /// The GPU backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The device pool and texture manager.
    #[must_use]
    pub fn texture_manager(&self) -> &BufferTextureManager<D> {
        &self.textures
    }

    /// Iterations run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Lifecycle state of `plane`, or `None` if it is not configured.
    #[must_use]
    pub fn plane_state(&self, plane: PlaneId) -> Option<PlaneState> {
        let locals = match plane.kind() {
            PlaneKind::Graphics => &self.graphics,
            PlaneKind::Video => &self.video,
        };
        locals.get(plane.index()).map(|l| l.state)
    }

    /// Runs one iteration.
    pub fn step(&mut self, now: Instant, tracer: &mut Tracer<'_>) -> Result<FrameOutcome, RuntimeError> {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let store = Arc::clone(&self.store);
        let tick = Tick { now, frame_index };
        for (local, slot) in self.video.iter_mut().zip(store.video()) {
            update_plane(local, slot, &mut self.textures, &mut self.backend, None, tick, tracer)?;
        }
        let settle = Some(self.settle_delay);
        for (local, slot) in self.graphics.iter_mut().zip(store.graphics()) {
            update_plane(local, slot, &mut self.textures, &mut self.backend, settle, tick, tracer)?;
        }

        self.build_plan(&store);
        #[expect(clippy::cast_possible_truncation, reason = "at most eight planes")]
        let active = self.plan.len() as u32;
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            active_planes: active,
        });
        if active == 0 {
            tracer.idle(&IdleEvent { frame_index });
            return Ok(FrameOutcome::Idle);
        }

        self.backend.clear();
        submit_plan(&mut self.backend, &self.plan);
        for item in &self.plan.items {
            tracer.draw(&DrawEvent {
                frame_index,
                plane: item.plane,
                tier: item.tier,
                buffer_index: item.buffer_index,
            });
        }
        self.backend.present()?;
        tracer.present(&PresentEvent {
            frame_index,
            drawn: active,
        });

        if let Some(meter) = &mut self.meter
            && let Some(report) = meter.record_frame(now)
        {
            tracing::info!(fps = report.fps, frames = report.frames, elapsed_ms = report.elapsed_ms, "frame rate");
            tracer.frame_rate(&report);
        }
        Ok(FrameOutcome::Presented { drawn: active })
    }

    fn build_plan(&mut self, store: &PlaneStateStore) {
        self.plan.clear();
        for tier in Tier::ORDER {
            let (locals, slots) = match tier {
                Tier::Graphics => (&self.graphics, store.graphics()),
                Tier::UnderVideo | Tier::OverVideo => (&self.video, store.video()),
            };
            for (local, slot) in locals.iter().zip(slots) {
                if local.role.tier() != tier {
                    continue;
                }
                if let Some(item) = self.draw_item(local, slot) {
                    self.plan.push(item);
                }
            }
        }
    }

    /// The draw for a plane that is enabled and drawable, or `None`.
    fn draw_item(&self, local: &PlaneLocal, slot: &PlaneSlot) -> Option<DrawItem> {
        if !slot.is_enabled() || local.state != PlaneState::Ready {
            return None;
        }
        let res = local.resources.as_ref()?;
        let (buffer_index, program, blend) = match local.role {
            PlaneRole::Graphics { blend } => {
                let program = if self.channel_swap && local.format.needs_channel_swap() {
                    ProgramKind::SwapRedBlue
                } else {
                    ProgramKind::Passthrough
                };
                (0, program, blend)
            }
            PlaneRole::Video { .. } => {
                if !slot.frame_ready() {
                    return None;
                }
                let index = slot.data_index();
                if index >= res.params.count {
                    // Announced against a ring not applied yet.
                    tracing::debug!(plane = %local.id, index, count = res.params.count, "skipping stale buffer index");
                    return None;
                }
                (index, ProgramKind::Passthrough, BlendMode::Opaque)
            }
        };
        Some(DrawItem {
            plane: local.id,
            tier: local.role.tier(),
            texture: res.texture,
            device: res.device,
            buffer_index,
            program,
            blend,
            transform: local.transform,
            vertices: local.vertices,
            texcoords: res.texcoords,
        })
    }

    /// Deletes every texture, closes every device, then releases the
    /// backend.
    ///
    /// Tries every plane even if one fails and returns the first error.
    pub fn shutdown(&mut self) -> Result<(), RuntimeError> {
        let mut first_err = None;
        for local in self.video.iter_mut().chain(self.graphics.iter_mut()) {
            if let Some(res) = &local.resources {
                self.backend.delete_texture(res.texture);
            }
            local.state = PlaneState::Disabled;
        }
        // Devices close only after every texture is gone.
        for local in self.video.iter_mut().chain(self.graphics.iter_mut()) {
            if let Some(res) = local.resources.take()
                && let Err(e) = self.textures.release_device(res.device)
            {
                tracing::error!(plane = %local.id, error = %e, "closing device");
                first_err.get_or_insert(RuntimeError::Device {
                    plane: local.id,
                    source: e,
                });
            }
        }
        self.backend.release();
        tracing::info!(frames = self.frame_index, "compositor shut down");
        first_err.map_or(Ok(()), Err)
    }
}

/// Where the current iteration is.
#[derive(Clone, Copy, Debug)]
struct Tick {
    now: Instant,
    frame_index: u64,
}

fn transition(local: &mut PlaneLocal, to: PlaneState, frame_index: u64, tracer: &mut Tracer<'_>) {
    if local.state == to {
        return;
    }
    tracing::debug!(plane = %local.id, from = ?local.state, ?to, "plane state");
    tracer.plane_transition(&PlaneTransitionEvent {
        frame_index,
        plane: local.id,
        from: local.state,
        to,
    });
    local.state = to;
}

/// Pulls the plane's pending update and applies what is due.
///
/// `settle` delays recreation after a new input; `None` recreates at once.
fn update_plane<B: GpuBackend, D: StreamingDriver>(
    local: &mut PlaneLocal,
    slot: &PlaneSlot,
    textures: &mut BufferTextureManager<D>,
    backend: &mut B,
    settle: Option<Duration>,
    tick: Tick,
    tracer: &mut Tracer<'_>,
) -> Result<(), RuntimeError> {
    let frame_index = tick.frame_index;
    if let Some(update) = slot.take_pending() {
        local.staged = core::mem::take(&mut local.staged).merge(update);
    }
    if let Some(output) = local.staged.output.take() {
        local.vertices = output.vertices;
    }
    if let Some(role) = local.staged.role.take() {
        local.role = role;
    }

    if !slot.is_enabled() {
        transition(local, PlaneState::Disabled, frame_index, tracer);
        return Ok(());
    }

    let Some(received_at) = local.staged.input.as_ref().map(|i| i.received_at) else {
        if local.state == PlaneState::Disabled {
            let to = if local.resources.is_some() {
                PlaneState::Ready
            } else {
                PlaneState::PendingInput
            };
            transition(local, to, frame_index, tracer);
        }
        return Ok(());
    };

    transition(local, PlaneState::PendingInput, frame_index, tracer);
    if let Some(delay) = settle
        && tick.now.saturating_duration_since(received_at) < delay
    {
        return Ok(());
    }

    let Some(input) = local.staged.input.take() else {
        return Ok(());
    };
    // Old resources are gone once materialize runs, whatever it returns.
    let current = local.resources.take();
    let res = textures
        .materialize(backend, current.as_ref(), &input.input)
        .map_err(|source| RuntimeError::Device {
            plane: local.id,
            source,
        })?;
    local.transform = Transform3d::from_rotation_z_degrees(input.input.rotation_degrees).to_cols_array_f32();
    local.format = input.input.format;
    local.resources = Some(res);
    tracing::info!(
        plane = %local.id,
        device = res.device.0,
        texture = res.texture.0,
        buffers = res.params.count,
        width = res.params.width,
        height = res.params.height,
        format = ?res.params.format,
        "plane resources recreated"
    );
    tracer.recreate(&RecreateEvent {
        frame_index,
        plane: local.id,
        device: res.device.0,
        texture: res.texture.0,
        buffer_count: res.params.count,
        format: res.params.format,
    });
    transition(local, PlaneState::Ready, frame_index, tracer);
    Ok(())
}
