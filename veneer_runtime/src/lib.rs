// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Threads, mailboxes, and the render loop of the veneer compositor.
//!
//! One ingestion worker per plane reads producer records from a
//! [`TransportEndpoint`](transport::TransportEndpoint) and publishes them into
//! that plane's slot of the shared [`PlaneStateStore`]. The render thread runs
//! a [`FrameComposer`], which picks up pending updates without ever blocking
//! behind a worker, recreates GPU resources only when an input actually
//! changed, and draws the enabled planes in tier order.
//!
//! ```text
//!  pipe ─► IngestWorker ─► PlaneSlot (mailbox + atomics) ─► FrameComposer ─► GpuBackend
//!                │                                               ▲
//!                └──── fatal errors (crossbeam) ──► Supervisor ───┘
//! ```
//!
//! [`Supervisor::run`] is the single place that decides to stop: worker
//! failures, device errors, and the quit flag all end up there, and the
//! composer is shut down on every exit path.

pub mod composer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod profile;
pub mod store;
pub mod supervisor;
pub mod transport;

pub use composer::{FrameComposer, FrameOutcome};
pub use config::{CompositorConfig, ConfigFileError};
pub use error::{IngestError, RuntimeError};
pub use store::{PlaneSlot, PlaneStateStore};
pub use supervisor::Supervisor;
