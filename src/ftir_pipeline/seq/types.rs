//! Sequence recording data types

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ftir_pipeline::common::error::{PipelineError, Result};

/// Size of the recording header preceding the first full frame.
pub const HEADER_BYTES: usize = 8192;

/// Byte offset of the nine little-endian `u32` image description fields.
pub const HEADER_FIELDS_OFFSET: usize = 548;

/// Coarse timestamp trailing each full frame: `i32` seconds + `u16` milliseconds.
pub const TIMESTAMP_BYTES: usize = 6;

/// Reinterpreted metadata rows must reach the FPA temperature field.
pub const META_ROW_MIN_BYTES: usize = 480;

/// Image description from the recording header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceHeader {
    pub image_width: u32,
    pub image_height: u32,
    pub bit_depth: u32,
    pub bit_depth_true: u32,
    /// Bytes of image data in one full frame (all subframes and metadata rows)
    pub image_size_bytes: u32,
    pub num_frames: u32,
    /// Stride between full frames in the body, padding included
    pub true_image_size: u32,
}

impl SequenceHeader {
    pub fn num_pixels(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }
}

/// Camera id and start time carried in a recording's file name,
/// `<camera>_camera_<YYYY_MM_DD_HH_MM_SS>.seq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceName {
    pub camera: String,
    pub start_time: NaiveDateTime,
}

impl SequenceName {
    pub fn parse(file_name: &str) -> Result<Self> {
        let stem = file_name.strip_suffix(".seq").unwrap_or(file_name);
        let (camera, stamp) = stem
            .split_once("_camera_")
            .ok_or_else(|| PipelineError::InvalidFileName(file_name.to_string()))?;
        let start_time = NaiveDateTime::parse_from_str(stamp, "%Y_%m_%d_%H_%M_%S")
            .map_err(|e| PipelineError::InvalidFileName(format!("{}: {}", file_name, e)))?;
        Ok(Self {
            camera: camera.to_string(),
            start_time,
        })
    }
}

/// Clock fields the FPA writes into each metadata row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpaClock {
    pub year: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub second: i16,
    pub millisecond: i16,
    pub microsecond: i16,
}

/// Metadata decoded from the row trailing each subframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMeta {
    pub part_number: String,
    pub serial_number: String,
    pub fpa_type: String,
    pub crc: u32,
    /// May reset to zero part way through a dataset
    pub frame_counter: i32,
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f32")]
    pub frame_time: f32,
    /// Integration time in seconds
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f32")]
    pub integration_time: f32,
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f32")]
    pub frequency: f32,
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f32")]
    pub board_temperature: f32,
    pub raw_nuc: u16,
    pub col_offset: i16,
    pub num_cols: i32,
    pub row_offset: i16,
    pub num_rows: i32,
    pub integration_ticks: u32,
    pub fpa_clock: FpaClock,
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f32")]
    pub fpa_temperature: f32,
    /// Shared by every subframe of one full frame
    pub coarse_timestamp: DateTime<Utc>,
}

/// One decoded subframe: a `rows x cols` image and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Subframe {
    pub rows: usize,
    pub cols: usize,
    /// Row-major signed samples
    pub image: Vec<i16>,
    pub meta: FrameMeta,
}

/// Output of decoding one recording, `gang * num_frames` subframes in order.
#[derive(Debug, Clone)]
pub struct DecodedSequence {
    pub header: SequenceHeader,
    pub gang: usize,
    pub subframes: Vec<Subframe>,
}

impl DecodedSequence {
    /// Data rows per subframe, `(height - G) / G`.
    pub fn sub_rows(&self) -> usize {
        (self.header.image_height as usize - self.gang) / self.gang
    }
}

/// A decoded recording with its synthetic per-subframe timestamps.
#[derive(Debug, Clone)]
pub struct Recording {
    pub name: Option<SequenceName>,
    pub sequence: DecodedSequence,
    pub timestamps: Vec<DateTime<Utc>>,
}
