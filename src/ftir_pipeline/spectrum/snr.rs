//! Signal-to-noise estimate from a trailing rolling deviation.

use rayon::prelude::*;
use realfft::num_complex::Complex64;

use crate::ftir_pipeline::common::cube::PixelSeries;
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::spectrum::types::ScanSpectrum;

/// Sample standard deviation (`n - 1` denominator) over each trailing
/// window of `window` values. The first `window - 1` entries are NaN, as is
/// every entry when `window == 1`.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(PipelineError::InvalidParameter(
            "rolling window must be at least 1".to_string(),
        ));
    }

    let mut out = vec![f64::NAN; values.len()];
    if window < 2 {
        return Ok(out);
    }

    // two passes per window, no running sums carried between windows
    for (o, w) in out.iter_mut().skip(window - 1).zip(values.windows(window)) {
        let mean = w.iter().sum::<f64>() / window as f64;
        let m2: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
        *o = (m2 / (window - 1) as f64).sqrt();
    }
    Ok(out)
}

/// `|spectrum| / rolling_std(|spectrum|, window)` for each bin.
pub fn snr(spectrum: &[Complex64], window: usize) -> Result<Vec<f64>> {
    let magnitude: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();
    let noise = rolling_std(&magnitude, window)?;
    Ok(magnitude.iter().zip(noise).map(|(m, s)| m / s).collect())
}

/// SNR of every pixel in a scan spectrum.
pub fn snr_scan(spectrum: &ScanSpectrum, window: usize) -> Result<PixelSeries> {
    let per_pixel: Vec<Vec<f64>> = (0..spectrum.spectra.pixels())
        .into_par_iter()
        .map(|p| snr(spectrum.spectra.pixel(p), window))
        .collect::<Result<_>>()?;

    PixelSeries::new(
        spectrum.bins(),
        spectrum.spectra.rows(),
        spectrum.spectra.cols(),
        per_pixel.into_iter().flatten().collect(),
    )
}
