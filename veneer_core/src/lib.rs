// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plane model, geometry, and wire records for live plane compositing.
//!
//! `veneer_core` holds the data model shared by the ingestion side (workers
//! that read producer records) and the render side (the frame composer). It is
//! `no_std` compatible (with `alloc`) so the pure parts can be reused by
//! producers and tooling without pulling in threads or I/O.
//!
//! # Architecture
//!
//! ```text
//!   producer ──► wire record ──► record::decode_* ──► PlaneDescriptor
//!                                                          │
//!                 ┌────────────────────────────────────────┘
//!                 ▼
//!   geometry::output_quad (ingestion)   geometry::texcoord_quad (render)
//!   transform::Transform3d::from_rotation_z_degrees (render)
//! ```
//!
//! **[`plane`]** — Plane identifiers, descriptors, and the per-plane lifecycle.
//!
//! **[`format`]** — Fourcc pixel formats and the channel-swap policy.
//!
//! **[`geometry`]** — Six-vertex quads for output position and crop texture
//! coordinates.
//!
//! **[`transform`]** — Column-major 4×4 rotation matrix.
//!
//! **[`record`]** — Fixed-size binary records exchanged with producers.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod error;
pub mod format;
pub mod geometry;
pub mod plane;
pub mod record;
pub mod trace;
pub mod transform;

pub use error::ConfigError;
