// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer-facing byte-stream endpoints.
//!
//! An endpoint is re-opened after every producer session. Opening blocks
//! until a producer connects; the returned reader yields end-of-file when the
//! producer goes away.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rustix::fs::{CWD, FileType, Mode};

/// A per-plane channel a producer writes records into.
pub trait TransportEndpoint: Send + 'static {
    /// Stream for one producer session.
    type Reader: Read;

    /// Waits for a producer and returns its stream.
    fn open(&mut self) -> io::Result<Self::Reader>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Named pipes
// ---------------------------------------------------------------------------

/// A named pipe (FIFO) on the local filesystem.
#[derive(Clone, Debug)]
pub struct FifoEndpoint {
    path: PathBuf,
}

impl FifoEndpoint {
    /// An endpoint for the pipe at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The pipe path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the pipe (and its directory) if nothing exists at the path.
    ///
    /// Returns whether a pipe was created.
    pub fn ensure_exists(&self) -> io::Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mode = Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::WGRP | Mode::ROTH | Mode::WOTH;
        rustix::fs::mknodat(CWD, &self.path, FileType::Fifo, mode, 0)?;
        Ok(true)
    }
}

impl TransportEndpoint for FifoEndpoint {
    type Reader = File;

    fn open(&mut self) -> io::Result<File> {
        // Blocks until a writer opens the other end.
        File::open(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// In-process
// ---------------------------------------------------------------------------

/// An in-process endpoint fed by a [`MemoryProducer`].
///
/// Each [`MemoryProducer::connect`] call is one producer session; its bytes
/// are read back in full and then end-of-file. Once every producer handle is
/// dropped, `open` fails with [`io::ErrorKind::NotConnected`].
#[derive(Debug)]
pub struct MemoryEndpoint {
    name: String,
    sessions: Receiver<Vec<u8>>,
}

/// Sending half of a [`MemoryEndpoint`].
#[derive(Clone, Debug)]
pub struct MemoryProducer {
    sessions: Sender<Vec<u8>>,
}

impl MemoryEndpoint {
    /// Creates a connected endpoint/producer pair.
    #[must_use]
    pub fn pair(name: impl Into<String>) -> (Self, MemoryProducer) {
        let (tx, rx) = unbounded();
        (
            Self {
                name: name.into(),
                sessions: rx,
            },
            MemoryProducer { sessions: tx },
        )
    }
}

impl MemoryProducer {
    /// Queues one producer session carrying `bytes`.
    ///
    /// Returns `false` if the endpoint is gone.
    pub fn connect(&self, bytes: Vec<u8>) -> bool {
        self.sessions.send(bytes).is_ok()
    }
}

impl TransportEndpoint for MemoryEndpoint {
    type Reader = Cursor<Vec<u8>>;

    fn open(&mut self) -> io::Result<Self::Reader> {
        self.sessions
            .recv()
            .map(Cursor::new)
            .map_err(|_| io::Error::new(io::ErrorKind::NotConnected, "no producer left"))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}
