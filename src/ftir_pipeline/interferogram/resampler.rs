//! Per-pixel OPD resampling.
//!
//! Each pixel of a scan is handled on its own: its ZPD is located, its frame
//! positions are converted to optical path difference and its intensities are
//! interpolated onto the scan's even grid. Pixels share only read-only inputs,
//! so they are spread across the rayon pool.

use rayon::prelude::*;
use tracing::debug;

use crate::ftir_pipeline::common::cube::{FrameCube, PixelSeries};
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::common::interp::{interp, mean};
use crate::ftir_pipeline::interferogram::types::{
    Direction, ResampleParams, ResampledScan, SamplingMode,
};

/// Optical path difference of each frame, twice the stage offset from ZPD.
pub fn opd_series(positions: &[f64], zpd: f64) -> Vec<f64> {
    positions.iter().map(|p| (p - zpd) * 2.0).collect()
}

/// Stage position taken as zero path difference for one pixel.
pub fn locate_zpd(positions: &[f64], intensity: &[f64], mode: SamplingMode) -> f64 {
    match mode {
        SamplingMode::Laser => mean(positions),
        SamplingMode::WhiteLight => {
            let mut best = 0;
            for (i, &v) in intensity.iter().enumerate() {
                if v > intensity[best] {
                    best = i;
                }
            }
            positions[best]
        }
    }
}

/// Interpolates a pixel onto `grid`, reversing a negative sweep so the OPD
/// knots ascend. `grid` is already in sweep order.
pub fn resample_pixel(opd: &[f64], intensity: &[f64], grid: &[f64], direction: Direction) -> Vec<f64> {
    match direction {
        Direction::Positive => interp(grid, opd, intensity),
        Direction::Negative => {
            let opd_rev: Vec<f64> = opd.iter().rev().copied().collect();
            let intensity_rev: Vec<f64> = intensity.iter().rev().copied().collect();
            interp(grid, &opd_rev, &intensity_rev)
        }
    }
}

/// Resamples every pixel of one scan.
///
/// `positions` holds one stage position per frame of `cube`. A scan of fewer
/// than two frames has no sweep direction and is rejected.
pub fn resample_scan(positions: &[f64], cube: &FrameCube, params: &ResampleParams) -> Result<ResampledScan> {
    if positions.len() != cube.frames() {
        return Err(PipelineError::InvalidParameter(format!(
            "{} positions for a scan of {} frames",
            positions.len(),
            cube.frames()
        )));
    }
    if positions.len() < 2 {
        return Err(PipelineError::InvalidParameter(format!(
            "a scan needs at least two frames, got {}",
            positions.len()
        )));
    }
    if !(params.sample_size > 0.0) || !(params.half_path_length > 0.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "sample size {} and half path length {} must be positive",
            params.sample_size, params.half_path_length
        )));
    }

    let direction = Direction::of(positions);
    let grid = params.grid(direction);
    debug!(
        "Resampling {} pixels of {} frames onto {} points ({:?} sweep)",
        cube.pixels(),
        cube.frames(),
        grid.len(),
        direction
    );

    let series = cube.to_pixel_series()?;
    let per_pixel: Vec<(f64, Vec<f64>, Vec<f64>)> = (0..series.pixels())
        .into_par_iter()
        .map(|p| {
            let intensity = series.pixel(p);
            let zpd = locate_zpd(positions, intensity, params.mode);
            let opd = opd_series(positions, zpd);
            let resampled = resample_pixel(&opd, intensity, &grid, direction);
            (zpd, opd, resampled)
        })
        .collect();

    let frames = cube.frames();
    let mut zpd = Vec::with_capacity(per_pixel.len());
    let mut raw_opd = Vec::with_capacity(per_pixel.len() * frames);
    let mut intensity = Vec::with_capacity(per_pixel.len() * grid.len());
    for (z, opd, resampled) in per_pixel {
        zpd.push(z);
        raw_opd.extend(opd);
        intensity.extend(resampled);
    }

    Ok(ResampledScan {
        direction,
        raw_opd: PixelSeries::new(frames, cube.rows(), cube.cols(), raw_opd)?,
        zpd,
        intensity: PixelSeries::new(grid.len(), cube.rows(), cube.cols(), intensity)?,
        grid,
    })
}
