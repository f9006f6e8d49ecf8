// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample veneer producer.
//!
//! ```text
//! plane_feeder video <pipe> [frames]
//! plane_feeder graphics <pipe> [seconds]
//! ```
//!
//! `video` writes one configuration record for a three-buffer ring, then
//! `frames` data records cycling through the ring at 30 Hz, then a close
//! record. `graphics` enables a fullscreen ARGB plane, keeps it up for
//! `seconds`, then disables it.
//!
//! The physical addresses are placeholders; against the software driver
//! they only need to be distinct.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veneer_core::format::FourCc;
use veneer_core::plane::{
    BlendMode, CropRect, OutputRect, OverlayOrder, PhysAddr, PlaneDescriptor, PlaneInput,
    PlaneRole,
};
use veneer_core::record::{GraphicsRecord, VideoRecord};

const RING: u32 = 3;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(mode), Some(pipe)) = (args.next(), args.next()) else {
        bail!("usage: plane_feeder <video|graphics> <pipe> [count]");
    };
    let pipe = PathBuf::from(pipe);
    let count: u32 = match args.next() {
        Some(n) => n.parse().with_context(|| format!("bad count {n:?}"))?,
        None => 90,
    };

    // Blocks until the compositor has the pipe open for reading.
    let mut out = OpenOptions::new()
        .write(true)
        .open(&pipe)
        .with_context(|| format!("opening {}", pipe.display()))?;
    tracing::info!(pipe = %pipe.display(), "connected");

    match mode.as_str() {
        "video" => feed_video(&mut out, count),
        "graphics" => feed_graphics(&mut out, count),
        other => bail!("unknown mode {other:?}, expected video or graphics"),
    }
}

fn input(buffers: u32, width: u32, height: u32, format: FourCc) -> PlaneInput {
    PlaneInput {
        buffers: (0..buffers)
            .map(|i| PhysAddr(0x8000_0000 + u64::from(i) * u64::from(width * height * 2)))
            .collect(),
        width,
        height,
        format,
        rotation_degrees: 0.0,
        crop: CropRect::default(),
    }
}

fn feed_video(out: &mut File, frames: u32) -> Result<()> {
    let config = PlaneDescriptor {
        enabled: true,
        input_valid: true,
        input: input(RING, 1280, 720, FourCc::UYVY),
        output_valid: true,
        output: OutputRect {
            x: -1.0,
            y: 1.0,
            width: 1.0,
            height: 1.0,
        },
        role: PlaneRole::Video {
            overlay: OverlayOrder::UnderGraphics,
        },
    };
    out.write_all(bytemuck::bytes_of(&VideoRecord::config(&config)))?;
    tracing::info!(buffers = RING, "sent configuration");

    for frame in 0..frames {
        out.write_all(bytemuck::bytes_of(&VideoRecord::data(frame % RING)))?;
        thread::sleep(FRAME_INTERVAL);
    }
    tracing::info!(frames, "sent data records");

    out.write_all(bytemuck::bytes_of(&VideoRecord::close()))?;
    tracing::info!("sent close");
    Ok(())
}

fn feed_graphics(out: &mut File, seconds: u32) -> Result<()> {
    let mut desc = PlaneDescriptor {
        enabled: true,
        input_valid: true,
        input: input(1, 1920, 1080, FourCc::ARGB),
        output_valid: true,
        output: OutputRect::FULLSCREEN,
        role: PlaneRole::Graphics {
            blend: BlendMode::PixelAlpha,
        },
    };
    out.write_all(bytemuck::bytes_of(&GraphicsRecord::from_descriptor(&desc)))?;
    tracing::info!("graphics plane enabled");

    thread::sleep(Duration::from_secs(seconds.into()));

    desc.enabled = false;
    desc.input_valid = false;
    desc.output_valid = false;
    out.write_all(bytemuck::bytes_of(&GraphicsRecord::from_descriptor(&desc)))?;
    tracing::info!("graphics plane disabled");
    Ok(())
}
