// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size binary records exchanged with producers.
//!
//! Producers write whole records into a plane's byte stream. Both layouts are
//! `#[repr(C)]` with no padding and native byte order, so they can be cast
//! straight from a read buffer with [`bytemuck`].
//!
//! Graphics channels carry only [`GraphicsRecord`]s; every one of them is a
//! configuration. Video channels carry [`VideoRecord`]s tagged by a kind
//! discriminator: data (`0`), configuration (`1`), or close (`2`).

use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::error::ConfigError;
use crate::format::FourCc;
use crate::plane::{
    BlendMode, CropRect, MAX_VIDEO_BUFFERS, OutputRect, OverlayOrder, PhysAddr, PlaneDescriptor,
    PlaneInput, PlaneRole,
};

/// Size of a graphics record on the wire.
pub const GRAPHICS_RECORD_SIZE: usize = size_of::<GraphicsRecord>();

/// Size of a video record on the wire.
pub const VIDEO_RECORD_SIZE: usize = size_of::<VideoRecord>();

const _: () = assert!(GRAPHICS_RECORD_SIZE == 80);
const _: () = assert!(VIDEO_RECORD_SIZE == 200);

/// Video record kind: advance the displayed buffer.
pub const VIDEO_KIND_DATA: u32 = 0;
/// Video record kind: new configuration.
pub const VIDEO_KIND_CONFIG: u32 = 1;
/// Video record kind: producer is retiring the plane.
pub const VIDEO_KIND_CLOSE: u32 = 2;

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

/// Graphics plane configuration record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GraphicsRecord {
    /// Nonzero to composite the plane.
    pub enable: u32,
    /// Nonzero when the input fields are new.
    pub input_valid: u32,
    /// Physical address of the plane buffer.
    pub phys_addr: u64,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Fourcc pixel format.
    pub fourcc: u32,
    /// Nonzero to blend onto the planes below.
    pub enable_blending: u32,
    /// Nonzero to blend with `global_alpha` instead of per-pixel alpha.
    pub enable_global_alpha: u32,
    /// Constant alpha in `[0, 1]`.
    pub global_alpha: f32,
    /// Rotation in degrees.
    pub rotate: f32,
    /// Crop left edge.
    pub crop_x: u32,
    /// Crop top edge.
    pub crop_y: u32,
    /// Crop width, 0 for full width.
    pub crop_width: u32,
    /// Crop height, 0 for full height.
    pub crop_height: u32,
    /// Nonzero when the output fields are new.
    pub output_valid: u32,
    /// Output left edge (NDC).
    pub xpos: f32,
    /// Output top edge (NDC).
    pub ypos: f32,
    /// Output width (NDC).
    pub out_width: f32,
    /// Output height (NDC).
    pub out_height: f32,
}

/// Video plane record.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VideoRecord {
    /// [`VIDEO_KIND_DATA`], [`VIDEO_KIND_CONFIG`], or [`VIDEO_KIND_CLOSE`].
    pub kind: u32,
    /// Buffer ready for display (data records).
    pub buffer_index: u32,
    /// Nonzero to composite the plane.
    pub enable: u32,
    /// 0 draws under graphics, 1 over.
    pub overlay: u32,
    /// Rotation in degrees.
    pub rotate: f32,
    /// Number of valid entries in `phys_addrs`.
    pub count: u32,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Fourcc pixel format.
    pub fourcc: u32,
    /// Crop left edge.
    pub crop_x: u32,
    /// Crop top edge.
    pub crop_y: u32,
    /// Crop width, 0 for full width.
    pub crop_width: u32,
    /// Crop height, 0 for full height.
    pub crop_height: u32,
    /// Must be zero.
    pub reserved: u32,
    /// Buffer ring addresses.
    pub phys_addrs: [u64; MAX_VIDEO_BUFFERS],
    /// Output left edge (NDC).
    pub xpos: f32,
    /// Output top edge (NDC).
    pub ypos: f32,
    /// Output width (NDC).
    pub out_width: f32,
    /// Output height (NDC).
    pub out_height: f32,
}

impl Default for VideoRecord {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

// ---------------------------------------------------------------------------
// Decoded messages
// ---------------------------------------------------------------------------

/// A decoded video record.
#[derive(Clone, Debug, PartialEq)]
pub enum VideoMessage {
    /// New configuration.
    Config(PlaneDescriptor),
    /// Buffer `index` of the current ring is ready for display.
    Data(u32),
    /// The producer is retiring the plane.
    Close,
}

/// Why a record could not be decoded.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RecordError {
    /// The byte count does not match the record layout.
    #[error("record is {actual} bytes, expected {expected}")]
    Size {
        /// Expected size.
        expected: usize,
        /// Size received.
        actual: usize,
    },
    /// Unrecognized video record kind.
    #[error("unknown video record kind {0}")]
    UnknownKind(u32),
    /// The record decoded but describes an unusable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RecordError {
    /// Whether the compositor must stop.
    ///
    /// Size and kind mismatches are the producer's problem and are dropped;
    /// configuration errors are not recoverable.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn cast<T: Pod>(bytes: &[u8]) -> Result<T, RecordError> {
    if bytes.len() != size_of::<T>() {
        return Err(RecordError::Size {
            expected: size_of::<T>(),
            actual: bytes.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}

/// Decodes and validates a graphics record.
pub fn decode_graphics(bytes: &[u8]) -> Result<PlaneDescriptor, RecordError> {
    let r: GraphicsRecord = cast(bytes)?;
    let desc = PlaneDescriptor {
        enabled: r.enable != 0,
        input_valid: r.input_valid != 0,
        input: PlaneInput {
            buffers: alloc::vec![PhysAddr(r.phys_addr)],
            width: r.width,
            height: r.height,
            format: FourCc(r.fourcc),
            rotation_degrees: r.rotate,
            crop: CropRect {
                x: r.crop_x,
                y: r.crop_y,
                width: r.crop_width,
                height: r.crop_height,
            },
        },
        output_valid: r.output_valid != 0,
        output: OutputRect {
            x: r.xpos,
            y: r.ypos,
            width: r.out_width,
            height: r.out_height,
        },
        role: PlaneRole::Graphics {
            blend: BlendMode::from_flags(
                r.enable_blending != 0,
                r.enable_global_alpha != 0,
                r.global_alpha,
            ),
        },
    };
    // A record that changes neither input nor output only toggles `enabled`.
    if desc.input_valid {
        desc.input.validate(1)?;
    }
    if desc.output_valid && !desc.output.is_finite() {
        return Err(ConfigError::NonFinite { field: "output" }.into());
    }
    Ok(desc)
}

/// Decodes and validates a video record.
pub fn decode_video(bytes: &[u8]) -> Result<VideoMessage, RecordError> {
    let r: VideoRecord = cast(bytes)?;
    match r.kind {
        VIDEO_KIND_DATA => Ok(VideoMessage::Data(r.buffer_index)),
        VIDEO_KIND_CLOSE => Ok(VideoMessage::Close),
        VIDEO_KIND_CONFIG => {
            let count = r.count as usize;
            if count > MAX_VIDEO_BUFFERS {
                return Err(ConfigError::TooManyBuffers {
                    count: r.count,
                    max: MAX_VIDEO_BUFFERS,
                }
                .into());
            }
            let buffers: Vec<PhysAddr> = r.phys_addrs[..count].iter().map(|&a| PhysAddr(a)).collect();
            let desc = PlaneDescriptor {
                enabled: r.enable != 0,
                // A video configuration always carries both descriptions.
                input_valid: true,
                input: PlaneInput {
                    buffers,
                    width: r.width,
                    height: r.height,
                    format: FourCc(r.fourcc),
                    rotation_degrees: r.rotate,
                    crop: CropRect {
                        x: r.crop_x,
                        y: r.crop_y,
                        width: r.crop_width,
                        height: r.crop_height,
                    },
                },
                output_valid: true,
                output: OutputRect {
                    x: r.xpos,
                    y: r.ypos,
                    width: r.out_width,
                    height: r.out_height,
                },
                role: PlaneRole::Video {
                    overlay: if r.overlay != 0 {
                        OverlayOrder::OverGraphics
                    } else {
                        OverlayOrder::UnderGraphics
                    },
                },
            };
            desc.validate()?;
            Ok(VideoMessage::Config(desc))
        }
        other => Err(RecordError::UnknownKind(other)),
    }
}

// ---------------------------------------------------------------------------
// Encoding (producer side)
// ---------------------------------------------------------------------------

impl GraphicsRecord {
    /// Encodes a graphics descriptor.
    ///
    /// Only the first buffer of the input is carried.
    #[must_use]
    pub fn from_descriptor(desc: &PlaneDescriptor) -> Self {
        let (enable_blending, enable_global_alpha, global_alpha) = match desc.role {
            PlaneRole::Graphics {
                blend: BlendMode::PixelAlpha,
            } => (1, 0, 1.0),
            PlaneRole::Graphics {
                blend: BlendMode::GlobalAlpha(a),
            } => (1, 1, a),
            _ => (0, 0, 1.0),
        };
        Self {
            enable: desc.enabled.into(),
            input_valid: desc.input_valid.into(),
            phys_addr: desc.input.buffers.first().map_or(0, |a| a.0),
            width: desc.input.width,
            height: desc.input.height,
            fourcc: desc.input.format.0,
            enable_blending,
            enable_global_alpha,
            global_alpha,
            rotate: desc.input.rotation_degrees,
            crop_x: desc.input.crop.x,
            crop_y: desc.input.crop.y,
            crop_width: desc.input.crop.width,
            crop_height: desc.input.crop.height,
            output_valid: desc.output_valid.into(),
            xpos: desc.output.x,
            ypos: desc.output.y,
            out_width: desc.output.width,
            out_height: desc.output.height,
        }
    }
}

impl VideoRecord {
    /// A configuration record for a video descriptor.
    ///
    /// Buffers past [`MAX_VIDEO_BUFFERS`] are not carried.
    #[must_use]
    pub fn config(desc: &PlaneDescriptor) -> Self {
        let mut phys_addrs = [0_u64; MAX_VIDEO_BUFFERS];
        for (slot, addr) in phys_addrs.iter_mut().zip(&desc.input.buffers) {
            *slot = addr.0;
        }
        let overlay = matches!(
            desc.role,
            PlaneRole::Video {
                overlay: OverlayOrder::OverGraphics
            }
        );
        Self {
            kind: VIDEO_KIND_CONFIG,
            buffer_index: 0,
            enable: desc.enabled.into(),
            overlay: overlay.into(),
            rotate: desc.input.rotation_degrees,
            count: u32::try_from(desc.input.buffer_count()).unwrap_or(u32::MAX),
            width: desc.input.width,
            height: desc.input.height,
            fourcc: desc.input.format.0,
            crop_x: desc.input.crop.x,
            crop_y: desc.input.crop.y,
            crop_width: desc.input.crop.width,
            crop_height: desc.input.crop.height,
            reserved: 0,
            phys_addrs,
            xpos: desc.output.x,
            ypos: desc.output.y,
            out_width: desc.output.width,
            out_height: desc.output.height,
        }
    }

    /// A data record announcing buffer `index`.
    #[must_use]
    pub fn data(index: u32) -> Self {
        Self {
            kind: VIDEO_KIND_DATA,
            buffer_index: index,
            ..Self::default()
        }
    }

    /// A close record.
    #[must_use]
    pub fn close() -> Self {
        Self {
            kind: VIDEO_KIND_CLOSE,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn video_desc(count: usize) -> PlaneDescriptor {
        PlaneDescriptor {
            enabled: true,
            input_valid: true,
            input: PlaneInput {
                buffers: (0..count as u64).map(|i| PhysAddr(0x8000_0000 + i * 0x10_0000)).collect(),
                width: 120,
                height: 80,
                format: FourCc::UYVY,
                rotation_degrees: 0.0,
                crop: CropRect::default(),
            },
            output_valid: true,
            output: OutputRect::FULLSCREEN,
            role: PlaneRole::Video {
                overlay: OverlayOrder::OverGraphics,
            },
        }
    }

    #[test]
    fn field_offsets_match_wire_layout() {
        assert_eq!(core::mem::offset_of!(GraphicsRecord, phys_addr), 8);
        assert_eq!(core::mem::offset_of!(GraphicsRecord, output_valid), 60);
        assert_eq!(core::mem::offset_of!(VideoRecord, phys_addrs), 56);
        assert_eq!(core::mem::offset_of!(VideoRecord, xpos), 184);
    }

    #[test]
    fn video_config_decodes_buffers_and_overlay() {
        let rec = VideoRecord::config(&video_desc(3));
        let msg = decode_video(bytemuck::bytes_of(&rec)).unwrap();
        let VideoMessage::Config(desc) = msg else {
            panic!("expected config, got {msg:?}");
        };
        assert_eq!(desc, video_desc(3));
    }

    #[test]
    fn data_and_close_kinds() {
        let data = VideoRecord::data(2);
        assert_eq!(decode_video(bytemuck::bytes_of(&data)), Ok(VideoMessage::Data(2)));
        let close = VideoRecord::close();
        assert_eq!(decode_video(bytemuck::bytes_of(&close)), Ok(VideoMessage::Close));
    }

    #[test]
    fn unknown_kind_is_not_fatal() {
        let rec = VideoRecord {
            kind: 7,
            ..VideoRecord::default()
        };
        let err = decode_video(bytemuck::bytes_of(&rec)).unwrap_err();
        assert_eq!(err, RecordError::UnknownKind(7));
        assert!(!err.is_fatal());
    }

    #[test]
    fn short_record_is_a_size_error() {
        let rec = VideoRecord::data(0);
        let bytes = &bytemuck::bytes_of(&rec)[..100];
        assert_eq!(
            decode_video(bytes),
            Err(RecordError::Size {
                expected: 200,
                actual: 100
            })
        );
    }

    #[test]
    fn oversized_buffer_count_is_fatal() {
        let mut rec = VideoRecord::config(&video_desc(4));
        rec.count = 17;
        let err = decode_video(bytemuck::bytes_of(&rec)).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            RecordError::Config(ConfigError::TooManyBuffers { count: 17, max: 16 })
        );
    }

    #[test]
    fn graphics_blend_flags_decode() {
        let rec = GraphicsRecord {
            enable: 1,
            input_valid: 1,
            phys_addr: 0x9000_0000,
            width: 640,
            height: 480,
            fourcc: FourCc::ARGB.0,
            enable_blending: 1,
            enable_global_alpha: 1,
            global_alpha: 0.25,
            output_valid: 1,
            xpos: -1.0,
            ypos: 1.0,
            out_width: 2.0,
            out_height: 2.0,
            ..GraphicsRecord::default()
        };
        let desc = decode_graphics(bytemuck::bytes_of(&rec)).unwrap();
        assert_eq!(desc.role, PlaneRole::Graphics {
            blend: BlendMode::GlobalAlpha(0.25)
        });
        assert_eq!(desc.input.buffers, vec![PhysAddr(0x9000_0000)]);
        assert_eq!(GraphicsRecord::from_descriptor(&desc), rec);
    }

    #[test]
    fn graphics_nan_rotation_is_fatal_only_with_new_input() {
        let mut rec = GraphicsRecord {
            width: 4,
            height: 4,
            rotate: f32::NAN,
            ..GraphicsRecord::default()
        };
        assert!(decode_graphics(bytemuck::bytes_of(&rec)).is_ok(), "input not flagged");
        rec.input_valid = 1;
        let err = decode_graphics(bytemuck::bytes_of(&rec)).unwrap_err();
        assert!(err.is_fatal());
    }
}
