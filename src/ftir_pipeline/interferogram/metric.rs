//! Fringe modulation summary of a scan.

use crate::ftir_pipeline::common::cube::PixelSeries;
use crate::ftir_pipeline::common::interp::mean;

/// Pixel-averaged intensity statistics; `ratio` is the mean over pixels of
/// `(max - min) / mean`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationSummary {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub ratio: f64,
}

pub fn modulation_summary(series: &PixelSeries) -> ModulationSummary {
    let mut maxes = Vec::with_capacity(series.pixels());
    let mut mins = Vec::with_capacity(series.pixels());
    let mut means = Vec::with_capacity(series.pixels());
    let mut ratios = Vec::with_capacity(series.pixels());

    for pixel in series.iter() {
        let max = pixel.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = pixel.iter().copied().fold(f64::INFINITY, f64::min);
        let avg = mean(pixel);
        maxes.push(max);
        mins.push(min);
        means.push(avg);
        ratios.push((max - min) / avg);
    }

    ModulationSummary {
        max: mean(&maxes),
        min: mean(&mins),
        mean: mean(&means),
        ratio: mean(&ratios),
    }
}
