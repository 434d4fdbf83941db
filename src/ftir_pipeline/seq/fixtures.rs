//! Builders for synthetic recordings used across the test suite.

use crate::ftir_pipeline::seq::types::{HEADER_BYTES, HEADER_FIELDS_OFFSET, TIMESTAMP_BYTES};

#[derive(Debug, Clone)]
pub struct MetaRow {
    pub frame_counter: i32,
    pub integration_time: f32,
}

impl Default for MetaRow {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            integration_time: 0.002,
        }
    }
}

impl MetaRow {
    /// The row as it sits on disk: big-endian fields, word-swapped.
    pub fn encode(&self, width: usize) -> Vec<u8> {
        let mut row = vec![0u8; (width * 2).max(480)];
        put(&mut row, 2, b"PN-42");
        put(&mut row, 34, b"SN7");
        put(&mut row, 48, b"InGaAs");
        put(&mut row, 64, &0xDEAD_BEEFu32.to_be_bytes());
        put(&mut row, 68, &self.frame_counter.to_be_bytes());
        put(&mut row, 72, &0.01f32.to_be_bytes());
        put(&mut row, 76, &self.integration_time.to_be_bytes());
        put(&mut row, 80, &100.0f32.to_be_bytes());
        put(&mut row, 120, &31.5f32.to_be_bytes());
        put(&mut row, 124, &513u16.to_be_bytes());
        put(&mut row, 130, &4i16.to_be_bytes());
        put(&mut row, 132, &239i16.to_be_bytes());
        put(&mut row, 136, &(-2i16).to_be_bytes());
        put(&mut row, 138, &7i16.to_be_bytes());
        put(&mut row, 142, &70_000u32.to_be_bytes());
        for (i, v) in [2025i16, 63, 14, 40, 35, 120, 999].iter().enumerate() {
            put(&mut row, 192 + 2 * i, &v.to_be_bytes());
        }
        put(&mut row, 476, &(-40.25f32).to_be_bytes());

        row.truncate(width * 2);
        row.chunks_exact(2).flat_map(|w| [w[1], w[0]]).collect()
    }
}

fn put(row: &mut [u8], at: usize, bytes: &[u8]) {
    row[at..at + bytes.len()].copy_from_slice(bytes);
}

/// A recording of `frames` full frames, each holding `gang` subframes of
/// three data rows.
#[derive(Debug, Clone)]
pub struct SyntheticSequence {
    pub width: usize,
    pub gang: usize,
    pub frames: usize,
    pub sub_rows: usize,
    /// Extra bytes after each frame's timestamp
    pub padding: usize,
    /// One per subframe; missing entries count up from zero
    pub meta: Vec<MetaRow>,
    /// One `(seconds, millis)` per full frame; missing entries tick by one second
    pub coarse: Vec<(i32, u16)>,
}

impl SyntheticSequence {
    pub fn new(width: usize, gang: usize, frames: usize) -> Self {
        Self {
            width,
            gang,
            frames,
            sub_rows: 3,
            padding: 0,
            meta: Vec::new(),
            coarse: Vec::new(),
        }
    }

    pub fn pixel_value(frame: usize, sub: usize, y: usize, x: usize) -> i16 {
        (frame * 1000 + sub * 100 + y * 10 + x % 10) as i16 - 500
    }

    pub fn height(&self) -> usize {
        self.gang * (self.sub_rows + 1)
    }

    pub fn encode(&self) -> Vec<u8> {
        let image_size = self.gang * (self.sub_rows + 1) * self.width * 2;
        let stride = image_size + TIMESTAMP_BYTES + self.padding;

        let mut out = vec![0u8; HEADER_BYTES];
        let fields = [
            self.width as u32,
            self.height() as u32,
            16,
            14,
            image_size as u32,
            0,
            self.frames as u32,
            0,
            stride as u32,
        ];
        for (i, v) in fields.iter().enumerate() {
            put(&mut out, HEADER_FIELDS_OFFSET + 4 * i, &v.to_le_bytes());
        }

        for f in 0..self.frames {
            for s in 0..self.gang {
                for y in 0..self.sub_rows {
                    for x in 0..self.width {
                        out.extend_from_slice(&Self::pixel_value(f, s, y, x).to_le_bytes());
                    }
                }
                let index = f * self.gang + s;
                let row = self.meta.get(index).cloned().unwrap_or(MetaRow {
                    frame_counter: index as i32,
                    ..MetaRow::default()
                });
                out.extend(row.encode(self.width));
            }
            let (secs, millis) = self
                .coarse
                .get(f)
                .copied()
                .unwrap_or((1_741_100_000 + f as i32, 0));
            out.extend_from_slice(&secs.to_le_bytes());
            out.extend_from_slice(&millis.to_le_bytes());
            out.extend(std::iter::repeat_n(0u8, self.padding));
        }
        out
    }
}
