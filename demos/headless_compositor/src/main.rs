// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless veneer compositor.
//!
//! Serves every configured plane pipe and composes with the software driver
//! and a counting GPU backend, so the full ingestion and render path can be
//! exercised without a display.
//!
//! ```text
//! headless_compositor [config.toml]
//! ```
//!
//! Stops on Ctrl-C or SIGTERM. Frame-loop events are forwarded to `tracing`
//! under the `veneer::frame` target.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veneer_core::trace::Tracer;
use veneer_debug::log::TracingSink;
use veneer_render::{RecordingBackend, SoftwareDriver};
use veneer_runtime::{CompositorConfig, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => CompositorConfig::load(Path::new(&path))
            .with_context(|| format!("loading {}", Path::new(&path).display()))?,
        None => CompositorConfig::default(),
    };
    tracing::info!(
        pipes = %config.pipe_dir.display(),
        graphics = config.graphics_planes,
        video = config.video_planes,
        "starting headless compositor"
    );

    let mut supervisor = Supervisor::new(config)?;
    supervisor.start_fifo_workers()?;

    let quit = Arc::new(AtomicBool::new(false));
    let mut render = {
        let quit = Arc::clone(&quit);
        tokio::task::spawn_blocking(move || {
            let mut composer = supervisor.composer(RecordingBackend::counting(), SoftwareDriver::new());
            let mut sink = TracingSink;
            let result = supervisor.run(&mut composer, &quit, &mut Tracer::new(&mut sink));
            (result, composer.backend().presents())
        })
    };

    let mut terminate = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    let joined = tokio::select! {
        done = &mut render => done,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            quit.store(true, Ordering::Release);
            render.await
        }
        _ = terminate.recv() => {
            tracing::info!("terminated");
            quit.store(true, Ordering::Release);
            render.await
        }
    };

    let (result, presents) = joined.context("render thread panicked")?;
    tracing::info!(presents, "compositor stopped");
    result?;
    Ok(())
}
