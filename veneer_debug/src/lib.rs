// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and export for veneer frame-loop diagnostics.
//!
//! This crate provides [`TraceSink`](veneer_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — in-memory event log with per-plane queries.
//! - [`json::export`] — writes a recorded log as a JSON array.
//! - [`log::TracingSink`] — forwards events to the `tracing` crate.

pub mod json;
pub mod log;
pub mod pretty;
pub mod recorder;
