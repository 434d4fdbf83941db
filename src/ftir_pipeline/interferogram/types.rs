//! Interferogram resampling types

use serde::{Deserialize, Serialize};

use crate::ftir_pipeline::common::cube::PixelSeries;

/// Fraction of the nominal stage travel kept for the resample grid. The rest
/// is trimmed so the grid stays symmetric about ZPD when a sweep is not
/// centred on it.
pub const DEFAULT_TRAVEL_MARGIN: f64 = 0.90;

/// How the zero path difference is located for each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingMode {
    /// ZPD at the position of the pixel's brightest frame
    WhiteLight,
    /// ZPD at the mean position of the scan
    Laser,
}

/// Travel direction of the stage over one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// `Positive` when the scan ends further out than it starts.
    pub fn of(positions: &[f64]) -> Self {
        match (positions.first(), positions.last()) {
            (Some(first), Some(last)) if first < last => Direction::Positive,
            _ => Direction::Negative,
        }
    }
}

/// Parameters of the even OPD grid, in stage length units (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampleParams {
    /// Nominal one-way travel from the centre of the sweep
    pub half_path_length: f64,
    /// OPD spacing of the resample grid
    pub sample_size: f64,
    pub margin: f64,
    pub mode: SamplingMode,
}

impl ResampleParams {
    /// Grid intervals, `floor(2 * half_path * margin / sample_size)` rounded up
    /// to an even count.
    pub fn num_samples(&self) -> usize {
        let usable_travel = 2.0 * self.half_path_length * self.margin;
        let mut n = (usable_travel / self.sample_size).floor().abs() as usize;
        if n % 2 == 1 {
            n += 1;
        }
        n
    }

    /// `num_samples + 1` points at `k * sample_size`, `k` in `-n/2..=n/2`,
    /// ascending for a positive sweep and descending for a negative one.
    pub fn grid(&self, direction: Direction) -> Vec<f64> {
        let half = (self.num_samples() / 2) as i64;
        let mut grid: Vec<f64> = (-half..=half)
            .map(|k| k as f64 * self.sample_size)
            .collect();
        if direction == Direction::Negative {
            grid.reverse();
        }
        grid
    }
}

/// One scan resampled onto its even OPD grid.
///
/// The grid is the same for every pixel of the scan, so it is stored once.
#[derive(Debug, Clone)]
pub struct ResampledScan {
    pub direction: Direction,
    /// Per pixel, the OPD of each raw frame
    pub raw_opd: PixelSeries,
    /// Per pixel, the stage position taken as ZPD
    pub zpd: Vec<f64>,
    pub grid: Vec<f64>,
    /// Per pixel, intensity interpolated onto `grid`
    pub intensity: PixelSeries,
}

impl ResampledScan {
    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    /// Grid step in stage units.
    pub fn spacing(&self) -> f64 {
        match self.grid.as_slice() {
            [a, b, ..] => (b - a).abs(),
            _ => 0.0,
        }
    }
}
