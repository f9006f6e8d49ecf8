// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the compositor runtime.

use std::io;

use thiserror::Error;
use veneer_core::ConfigError;
use veneer_core::plane::PlaneId;
use veneer_render::DeviceError;

use crate::config::ConfigFileError;

/// Fatal failure of one ingestion worker.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The plane's transport could not be opened.
    #[error("opening transport {endpoint} for {plane}: {source}")]
    Open {
        /// Plane served by the worker.
        plane: PlaneId,
        /// Endpoint description.
        endpoint: String,
        /// Underlying error.
        source: io::Error,
    },
    /// A producer sent an unusable configuration.
    #[error("{plane}: {source}")]
    Config {
        /// Plane served by the worker.
        plane: PlaneId,
        /// What was wrong.
        source: ConfigError,
    },
}

/// Anything that stops the compositor.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Bad compositor configuration.
    #[error(transparent)]
    Settings(#[from] ConfigFileError),
    /// A pipe could not be prepared at startup.
    #[error("preparing {path}: {source}")]
    Pipe {
        /// Pipe path.
        path: String,
        /// Underlying error.
        source: io::Error,
    },
    /// A worker thread could not be spawned.
    #[error("spawning worker for {plane}: {source}")]
    Spawn {
        /// Plane the worker would serve.
        plane: PlaneId,
        /// Underlying error.
        source: io::Error,
    },
    /// An ingestion worker failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// A plane's resources could not be realized.
    #[error("{plane}: {source}")]
    Device {
        /// Plane being realized.
        plane: PlaneId,
        /// What failed.
        source: DeviceError,
    },
    /// Presenting or tearing down failed.
    #[error(transparent)]
    Render(#[from] DeviceError),
    /// Every ingestion worker is gone.
    #[error("all ingestion workers exited")]
    WorkersGone,
}
