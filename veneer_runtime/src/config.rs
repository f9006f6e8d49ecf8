// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! pipe_dir = "/opt/gpu-compositing/named_pipes"
//! graphics_planes = 2
//! video_planes = 1
//! graphics_settle_ms = 40
//! profiling = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use veneer_core::plane::{MAX_GRAPHICS_PLANES, MAX_VIDEO_PLANES, PlaneId, PlaneKind};
use veneer_render::DEFAULT_DEVICE_POOL;

/// Problems loading or validating a [`CompositorConfig`].
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("reading {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The document is not valid TOML for this schema.
    #[error("parsing configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

fn default_pipe_dir() -> PathBuf {
    PathBuf::from("/opt/gpu-compositing/named_pipes")
}

fn default_graphics_pipe_prefix() -> String {
    "gfx_cfg_plane_".to_owned()
}

fn default_video_pipe_prefix() -> String {
    "video_cfg_plane_".to_owned()
}

const fn default_profile_interval() -> u32 {
    1000
}

const fn default_idle_sleep_ms() -> u64 {
    5
}

const fn default_close_grace_ms() -> u64 {
    150
}

const fn default_device_pool() -> usize {
    DEFAULT_DEVICE_POOL
}

const fn default_true() -> bool {
    true
}

/// Runtime settings for the compositor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositorConfig {
    /// Directory holding the per-plane named pipes.
    #[serde(default = "default_pipe_dir")]
    pub pipe_dir: PathBuf,
    /// Graphics pipe name prefix; the plane index is appended.
    #[serde(default = "default_graphics_pipe_prefix")]
    pub graphics_pipe_prefix: String,
    /// Video pipe name prefix; the plane index is appended.
    #[serde(default = "default_video_pipe_prefix")]
    pub video_pipe_prefix: String,
    /// Graphics planes to service, at most [`MAX_GRAPHICS_PLANES`].
    #[serde(default = "default_graphics_planes")]
    pub graphics_planes: usize,
    /// Video planes to service, at most [`MAX_VIDEO_PLANES`].
    #[serde(default = "default_video_planes")]
    pub video_planes: usize,
    /// Wait after a graphics input update before recreating its resources.
    #[serde(default)]
    pub graphics_settle_ms: u64,
    /// Use the red/blue swap program for formats that need it.
    #[serde(default = "default_true")]
    pub channel_swap: bool,
    /// Report the frame rate periodically.
    #[serde(default)]
    pub profiling: bool,
    /// Presented frames per frame-rate report.
    #[serde(default = "default_profile_interval")]
    pub profile_interval_frames: u32,
    /// Sleep between iterations with nothing to draw.
    #[serde(default = "default_idle_sleep_ms")]
    pub idle_sleep_ms: u64,
    /// Wait after a close record before re-arming the transport.
    #[serde(default = "default_close_grace_ms")]
    pub close_grace_ms: u64,
    /// Streaming devices available to all planes together.
    #[serde(default = "default_device_pool")]
    pub device_pool: usize,
    /// Create missing pipes at startup instead of failing.
    #[serde(default = "default_true")]
    pub create_pipes: bool,
}

const fn default_graphics_planes() -> usize {
    MAX_GRAPHICS_PLANES
}

const fn default_video_planes() -> usize {
    MAX_VIDEO_PLANES
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            pipe_dir: default_pipe_dir(),
            graphics_pipe_prefix: default_graphics_pipe_prefix(),
            video_pipe_prefix: default_video_pipe_prefix(),
            graphics_planes: MAX_GRAPHICS_PLANES,
            video_planes: MAX_VIDEO_PLANES,
            graphics_settle_ms: 0,
            channel_swap: true,
            profiling: false,
            profile_interval_frames: default_profile_interval(),
            idle_sleep_ms: default_idle_sleep_ms(),
            close_grace_ms: default_close_grace_ms(),
            device_pool: DEFAULT_DEVICE_POOL,
            create_pipes: true,
        }
    }
}

impl CompositorConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        if self.graphics_planes > MAX_GRAPHICS_PLANES {
            return Err(ConfigFileError::Invalid {
                field: "graphics_planes",
                reason: format!("{} exceeds the maximum of {MAX_GRAPHICS_PLANES}", self.graphics_planes),
            });
        }
        if self.video_planes > MAX_VIDEO_PLANES {
            return Err(ConfigFileError::Invalid {
                field: "video_planes",
                reason: format!("{} exceeds the maximum of {MAX_VIDEO_PLANES}", self.video_planes),
            });
        }
        if self.profile_interval_frames == 0 {
            return Err(ConfigFileError::Invalid {
                field: "profile_interval_frames",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.device_pool == 0 {
            return Err(ConfigFileError::Invalid {
                field: "device_pool",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// The planes this configuration services, graphics first.
    pub fn planes(&self) -> impl Iterator<Item = PlaneId> {
        (0..self.graphics_planes)
            .map(PlaneId::graphics)
            .chain((0..self.video_planes).map(PlaneId::video))
    }

    /// Path of the named pipe feeding `plane`.
    #[must_use]
    pub fn pipe_path(&self, plane: PlaneId) -> PathBuf {
        let prefix = match plane.kind() {
            PlaneKind::Graphics => &self.graphics_pipe_prefix,
            PlaneKind::Video => &self.video_pipe_prefix,
        };
        self.pipe_dir.join(format!("{prefix}{}", plane.index()))
    }

    /// [`graphics_settle_ms`](Self::graphics_settle_ms) as a duration.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.graphics_settle_ms)
    }

    /// [`idle_sleep_ms`](Self::idle_sleep_ms) as a duration.
    #[must_use]
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }

    /// [`close_grace_ms`](Self::close_grace_ms) as a duration.
    #[must_use]
    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(CompositorConfig::from_toml_str("").unwrap(), CompositorConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let cfg = CompositorConfig::from_toml_str(
            "graphics_planes = 2\nvideo_planes = 1\ngraphics_settle_ms = 40\n",
        )
        .unwrap();
        assert_eq!(cfg.graphics_planes, 2);
        assert_eq!(cfg.settle_delay(), Duration::from_millis(40));
        assert_eq!(cfg.idle_sleep(), Duration::from_millis(5));
        assert_eq!(cfg.planes().count(), 3);
    }

    #[test]
    fn plane_counts_are_bounded() {
        let err = CompositorConfig::from_toml_str("video_planes = 5").unwrap_err();
        assert!(matches!(err, ConfigFileError::Invalid { field: "video_planes", .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            CompositorConfig::from_toml_str("frobnicate = true"),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn pipe_names_append_plane_index() {
        let cfg = CompositorConfig::default();
        assert_eq!(
            cfg.pipe_path(PlaneId::graphics(2)),
            PathBuf::from("/opt/gpu-compositing/named_pipes/gfx_cfg_plane_2")
        );
        assert_eq!(
            cfg.pipe_path(PlaneId::video(0)),
            PathBuf::from("/opt/gpu-compositing/named_pipes/video_cfg_plane_0")
        );
    }

    #[test]
    fn serializes_back_to_toml() {
        let cfg = CompositorConfig {
            profiling: true,
            ..CompositorConfig::default()
        };
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(CompositorConfig::from_toml_str(&text).unwrap(), cfg);
    }
}
