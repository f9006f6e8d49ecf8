// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-plane configuration ingestion.
//!
//! One [`IngestWorker`] serves one plane for the life of the process. It
//! cycles through a small connection state machine:
//!
//! ```text
//!   WaitingForProducer ──open──► Streaming ──EOF / short read──► WaitingForProducer
//!                                    │
//!                                    └──close record──► Closed ──grace──► WaitingForProducer
//! ```
//!
//! Whenever a session ends the plane is disabled. Only two things stop a
//! worker: the transport cannot be opened, or a producer sends a
//! configuration that cannot be applied.

use std::convert::Infallible;
use std::io::{self, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use veneer_core::plane::{PlaneId, PlaneKind};
use veneer_core::record::{
    GRAPHICS_RECORD_SIZE, RecordError, VIDEO_RECORD_SIZE, VideoMessage, decode_graphics,
    decode_video,
};

use crate::error::{IngestError, RuntimeError};
use crate::store::{PlaneSlot, PlaneStateStore};
use crate::transport::TransportEndpoint;

/// Why a producer session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The producer closed its end between records.
    Disconnected,
    /// The producer closed its end partway through a record.
    ShortRecord {
        /// Bytes of the partial record.
        got: usize,
    },
    /// The producer sent a close record.
    Closed,
}

enum Connection<R> {
    WaitingForProducer,
    Streaming(R),
    Closed,
}

/// Reads records for one plane and publishes them to its slot.
#[derive(Debug)]
pub struct IngestWorker<T> {
    plane: PlaneId,
    store: Arc<PlaneStateStore>,
    endpoint: T,
    close_grace: Duration,
    buffer_count: Option<usize>,
}

impl<T: TransportEndpoint> IngestWorker<T> {
    /// Creates a worker for `plane`.
    ///
    /// # Panics
    ///
    /// Panics if `store` has no slot for `plane`.
    #[must_use]
    pub fn new(plane: PlaneId, store: Arc<PlaneStateStore>, endpoint: T, close_grace: Duration) -> Self {
        assert!(store.slot(plane).is_some(), "no slot for {plane}");
        Self {
            plane,
            store,
            endpoint,
            close_grace,
            buffer_count: None,
        }
    }

    fn slot(&self) -> &PlaneSlot {
        match self.store.slot(self.plane) {
            Some(slot) => slot,
            None => unreachable!("checked in IngestWorker::new"),
        }
    }

    fn record_size(&self) -> usize {
        match self.plane.kind() {
            PlaneKind::Graphics => GRAPHICS_RECORD_SIZE,
            PlaneKind::Video => VIDEO_RECORD_SIZE,
        }
    }

    /// Serves producer sessions until a fatal error.
    pub fn run(mut self) -> Result<Infallible, IngestError> {
        let mut conn = Connection::WaitingForProducer;
        loop {
            conn = match conn {
                Connection::WaitingForProducer => {
                    let reader = self.endpoint.open().map_err(|source| IngestError::Open {
                        plane: self.plane,
                        endpoint: self.endpoint.describe(),
                        source,
                    })?;
                    tracing::info!(plane = %self.plane, "producer connected");
                    Connection::Streaming(reader)
                }
                Connection::Streaming(reader) => match self.serve(reader)? {
                    SessionEnd::Closed => Connection::Closed,
                    SessionEnd::Disconnected | SessionEnd::ShortRecord { .. } => {
                        Connection::WaitingForProducer
                    }
                },
                Connection::Closed => {
                    thread::sleep(self.close_grace);
                    Connection::WaitingForProducer
                }
            };
        }
    }

    /// Reads records from one producer session until it ends.
    ///
    /// The plane is disabled when the session ends, however it ends.
    pub fn serve<R: Read>(&mut self, mut reader: R) -> Result<SessionEnd, IngestError> {
        let mut buf = vec![0_u8; self.record_size()];
        let end = loop {
            let got = match read_record(&mut reader, &mut buf) {
                Ok(got) => got,
                Err(e) => {
                    tracing::warn!(plane = %self.plane, error = %e, "read failed, dropping producer");
                    break SessionEnd::Disconnected;
                }
            };
            if got == 0 {
                break SessionEnd::Disconnected;
            }
            if got < buf.len() {
                tracing::warn!(
                    plane = %self.plane,
                    got,
                    expected = buf.len(),
                    "producer closed mid-record"
                );
                break SessionEnd::ShortRecord { got };
            }
            if let Some(end) = self.apply(&buf)? {
                break end;
            }
        };
        self.slot().disable();
        tracing::info!(plane = %self.plane, ?end, "producer session ended, plane disabled");
        Ok(end)
    }

    fn apply(&mut self, bytes: &[u8]) -> Result<Option<SessionEnd>, IngestError> {
        let result = match self.plane.kind() {
            PlaneKind::Graphics => decode_graphics(bytes).map(|desc| {
                tracing::debug!(
                    plane = %self.plane,
                    enabled = desc.enabled,
                    input = desc.input_valid,
                    output = desc.output_valid,
                    "graphics config"
                );
                self.slot().publish(desc, Instant::now());
                None
            }),
            PlaneKind::Video => decode_video(bytes).map(|msg| self.apply_video(msg)),
        };
        match result {
            Ok(end) => Ok(end),
            Err(RecordError::Config(source)) => Err(IngestError::Config {
                plane: self.plane,
                source,
            }),
            Err(e) => {
                tracing::warn!(plane = %self.plane, error = %e, "ignoring record");
                Ok(None)
            }
        }
    }

    fn apply_video(&mut self, msg: VideoMessage) -> Option<SessionEnd> {
        match msg {
            VideoMessage::Config(desc) => {
                tracing::debug!(
                    plane = %self.plane,
                    buffers = desc.input.buffer_count(),
                    format = ?desc.input.format,
                    "video config"
                );
                self.buffer_count = Some(desc.input.buffer_count());
                self.slot().publish(desc, Instant::now());
                None
            }
            VideoMessage::Data(index) => {
                match self.buffer_count {
                    Some(count) if (index as usize) < count => self.slot().set_data_index(index),
                    count => tracing::warn!(
                        plane = %self.plane,
                        index,
                        ?count,
                        "data record names a buffer outside the configured ring"
                    ),
                }
                None
            }
            VideoMessage::Close => Some(SessionEnd::Closed),
        }
    }
}

/// Fills `buf` unless the stream ends first; returns the bytes read.
fn read_record<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Runs `worker` on a named thread. A fatal error is logged and sent on
/// `fatal`.
pub fn spawn_worker<T: TransportEndpoint>(
    worker: IngestWorker<T>,
    fatal: Sender<RuntimeError>,
) -> io::Result<JoinHandle<()>> {
    let plane = worker.plane;
    thread::Builder::new()
        .name(format!("ingest-{plane}"))
        .spawn(move || match worker.run() {
            Ok(never) => match never {},
            Err(e) => {
                tracing::error!(%plane, error = %e, "ingestion worker failed");
                _ = fatal.send(e.into());
            }
        })
}
