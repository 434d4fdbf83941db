//! Decoder for ganged `.seq` camera recordings.
//!
//! A recording is an 8192-byte header followed by `num_frames` full-frame
//! blocks spaced `true_image_size` bytes apart. Each full frame packs `G`
//! subframes, every one a `sub_rows x width` block of little-endian `i16`
//! samples followed by one metadata row of `width` 16-bit words. The words of
//! a metadata row are stored little-endian but the fields inside are
//! big-endian, so the row is byte-swapped word by word before decoding. The
//! six bytes after the image data hold a coarse timestamp shared by all `G`
//! subframes of that full frame.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::seq::reader::SequenceReader;
use crate::ftir_pipeline::seq::types::{
    DecodedSequence, FpaClock, FrameMeta, SequenceHeader, Subframe, HEADER_BYTES,
    HEADER_FIELDS_OFFSET, META_ROW_MIN_BYTES, TIMESTAMP_BYTES,
};

/// Sequence reader for the ganged FPA recording layout.
pub struct GangedSeqReader;

impl SequenceReader for GangedSeqReader {
    /// Splits every full frame into `gang` subframes.
    ///
    /// # Returns
    ///
    /// * `Ok(DecodedSequence)` - `gang * num_frames` subframes in recording order
    /// * `Err(PipelineError::FormatError)` - the buffer is shorter than the
    ///   header declares, or the declared geometry cannot hold `gang` subframes
    fn read_sequence(&self, data: &[u8], gang: usize) -> Result<DecodedSequence> {
        debug!("Decoding sequence, {} bytes", data.len());

        if gang == 0 {
            return Err(PipelineError::InvalidParameter(
                "ganging factor must be at least 1".to_string(),
            ));
        }

        let header = parse_header(data)?;
        let layout = SubframeLayout::new(&header, gang)?;

        let stride = header.true_image_size as usize;
        let num_frames = header.num_frames as usize;
        let required = HEADER_BYTES + num_frames * stride;
        if data.len() < required {
            return Err(PipelineError::FormatError(format!(
                "{} full frames of {} bytes need {} bytes, buffer holds {}",
                num_frames,
                stride,
                required,
                data.len()
            )));
        }

        info!(
            "Reading {} ganged frames into {} subframes",
            num_frames,
            num_frames * gang
        );

        let body = &data[HEADER_BYTES..required];
        let per_frame: Vec<Vec<Subframe>> = body
            .par_chunks_exact(stride)
            .map(|block| {
                let image_bytes = header.image_size_bytes as usize;
                let frame = &block[..image_bytes + TIMESTAMP_BYTES];
                let coarse = parse_coarse_timestamp(&frame[image_bytes..])?;
                (0..gang)
                    .map(|s| layout.parse_subframe(frame, s, coarse))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        let subframes: Vec<Subframe> = per_frame.into_iter().flatten().collect();
        debug!("Decoded {} subframes of {}x{}", subframes.len(), layout.sub_rows, layout.width);

        Ok(DecodedSequence {
            header,
            gang,
            subframes,
        })
    }
}

pub fn parse_header(data: &[u8]) -> Result<SequenceHeader> {
    if data.len() < HEADER_BYTES {
        return Err(PipelineError::FormatError(format!(
            "header needs {} bytes, buffer holds {}",
            HEADER_BYTES,
            data.len()
        )));
    }

    let field = |i: usize| le_u32(data, HEADER_FIELDS_OFFSET + 4 * i);
    let header = SequenceHeader {
        image_width: field(0),
        image_height: field(1),
        bit_depth: field(2),
        bit_depth_true: field(3),
        image_size_bytes: field(4),
        num_frames: field(6),
        true_image_size: field(8),
    };
    debug!("Sequence header: {:?}", header);
    Ok(header)
}

/// Byte offsets of the subframes inside one full frame.
#[derive(Debug, Clone, Copy)]
struct SubframeLayout {
    width: usize,
    sub_rows: usize,
    pixel_bytes: usize,
    meta_bytes: usize,
}

impl SubframeLayout {
    fn new(header: &SequenceHeader, gang: usize) -> Result<Self> {
        let width = header.image_width as usize;
        let height = header.image_height as usize;
        if height <= gang {
            return Err(PipelineError::FormatError(format!(
                "image height {} leaves no data rows for {} subframes",
                height, gang
            )));
        }

        let sub_rows = (height - gang) / gang;
        let pixel_bytes = sub_rows * width * 2;
        let meta_bytes = width * 2;
        if meta_bytes < META_ROW_MIN_BYTES {
            return Err(PipelineError::FormatError(format!(
                "metadata row of {} bytes is shorter than {}",
                meta_bytes, META_ROW_MIN_BYTES
            )));
        }

        let image_bytes = header.image_size_bytes as usize;
        if gang * (pixel_bytes + meta_bytes) > image_bytes {
            return Err(PipelineError::FormatError(format!(
                "{} subframes of {} bytes overflow the {} byte image",
                gang,
                pixel_bytes + meta_bytes,
                image_bytes
            )));
        }
        if image_bytes + TIMESTAMP_BYTES > header.true_image_size as usize {
            return Err(PipelineError::FormatError(format!(
                "frame stride {} cannot hold {} image bytes and a timestamp",
                header.true_image_size, image_bytes
            )));
        }

        Ok(Self {
            width,
            sub_rows,
            pixel_bytes,
            meta_bytes,
        })
    }

    fn parse_subframe(&self, frame: &[u8], sub: usize, coarse: DateTime<Utc>) -> Result<Subframe> {
        let start = sub * (self.pixel_bytes + self.meta_bytes);
        let pixels = &frame[start..start + self.pixel_bytes];
        let meta_row = &frame[start + self.pixel_bytes..start + self.pixel_bytes + self.meta_bytes];

        let image = pixels
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();

        Ok(Subframe {
            rows: self.sub_rows,
            cols: self.width,
            image,
            meta: parse_meta_row(meta_row, coarse)?,
        })
    }
}

fn parse_coarse_timestamp(bytes: &[u8]) -> Result<DateTime<Utc>> {
    let seconds = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let millis = u16::from_le_bytes([bytes[4], bytes[5]]);
    let total_ms = seconds as i64 * 1000 + millis as i64;
    DateTime::from_timestamp_millis(total_ms).ok_or_else(|| {
        PipelineError::FormatError(format!("timestamp {}s {}ms out of range", seconds, millis))
    })
}

/// Decodes one metadata row as stored on disk.
pub fn parse_meta_row(stored: &[u8], coarse: DateTime<Utc>) -> Result<FrameMeta> {
    if stored.len() < META_ROW_MIN_BYTES {
        return Err(PipelineError::FormatError(format!(
            "metadata row of {} bytes is shorter than {}",
            stored.len(),
            META_ROW_MIN_BYTES
        )));
    }

    // little-endian words repacked big-endian
    let row: Vec<u8> = stored
        .chunks_exact(2)
        .flat_map(|w| [w[1], w[0]])
        .collect();

    let clock = |i: usize| be_i16(&row, 192 + 2 * i);

    Ok(FrameMeta {
        part_number: ascii_field(&row[2..34]),
        serial_number: ascii_field(&row[34..48]),
        fpa_type: ascii_field(&row[48..64]),
        crc: be_u32(&row, 64),
        frame_counter: be_u32(&row, 68) as i32,
        frame_time: be_f32(&row, 72),
        integration_time: be_f32(&row, 76),
        frequency: be_f32(&row, 80),
        board_temperature: be_f32(&row, 120),
        raw_nuc: be_u16(&row, 124),
        col_offset: be_i16(&row, 130),
        num_cols: be_i16(&row, 132) as i32 + 1,
        row_offset: be_i16(&row, 136),
        num_rows: be_i16(&row, 138) as i32 + 1,
        integration_ticks: be_u32(&row, 142),
        fpa_clock: FpaClock {
            year: clock(0),
            day: clock(1),
            hour: clock(2),
            minute: clock(3),
            second: clock(4),
            millisecond: clock(5),
            microsecond: clock(6),
        },
        fpa_temperature: be_f32(&row, 476),
        coarse_timestamp: coarse,
    })
}

fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn be_u32(b: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn be_u16(b: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([b[at], b[at + 1]])
}

fn be_i16(b: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([b[at], b[at + 1]])
}

fn be_f32(b: &[u8], at: usize) -> f32 {
    f32::from_bits(be_u32(b, at))
}
