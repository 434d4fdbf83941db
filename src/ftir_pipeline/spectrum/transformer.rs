//! Real-input Fourier transform of resampled interferograms.

use rayon::prelude::*;
use realfft::RealFftPlanner;
use realfft::num_complex::Complex64;
use tracing::debug;

use crate::ftir_pipeline::common::cube::PixelSeries;
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::interferogram::types::ResampledScan;
use crate::ftir_pipeline::spectrum::types::ScanSpectrum;

/// Non-negative frequencies of a real FFT of `n` samples spaced `spacing`
/// apart: `k / (n * spacing)` for `k` in `0..=n/2`.
pub fn rfft_frequencies(n: usize, spacing: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * spacing);
    (0..=n / 2).map(|k| k as f64 * scale).collect()
}

/// Transforms every pixel of a resampled scan.
///
/// `spacing_cm` is the grid step in centimetres, which puts the frequency
/// axis in cm^-1. The grid length is the same for every pixel, so one FFT
/// plan and one axis serve the whole scan.
pub fn transform_scan(scan: &ResampledScan, spacing_cm: f64) -> Result<ScanSpectrum> {
    if !(spacing_cm > 0.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "sample spacing {} must be positive",
            spacing_cm
        )));
    }

    let n = scan.intensity.len();
    let wavenumbers = rfft_frequencies(n, spacing_cm);
    let r2c = RealFftPlanner::<f64>::new().plan_fft_forward(n);
    debug!("Transforming {} pixels of {} samples", scan.intensity.pixels(), n);

    let per_pixel: Vec<Vec<Complex64>> = (0..scan.intensity.pixels())
        .into_par_iter()
        .map(|p| {
            let mut input = scan.intensity.pixel(p).to_vec();
            let mut output = r2c.make_output_vec();
            r2c.process(&mut input, &mut output)
                .map_err(|e| PipelineError::TransformError(e.to_string()))?;
            Ok(output)
        })
        .collect::<Result<_>>()?;

    let bins = wavenumbers.len();
    let data: Vec<Complex64> = per_pixel.into_iter().flatten().collect();
    Ok(ScanSpectrum {
        wavenumbers,
        spectra: PixelSeries::new(bins, scan.intensity.rows(), scan.intensity.cols(), data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftir_pipeline::interferogram::types::Direction;

    fn resampled(values: Vec<f64>, pixels: usize) -> ResampledScan {
        let len = values.len() / pixels;
        ResampledScan {
            direction: Direction::Positive,
            raw_opd: PixelSeries::new(1, 1, pixels, vec![0.0; pixels]).unwrap(),
            zpd: vec![0.0; pixels],
            grid: (0..len).map(|k| k as f64).collect(),
            intensity: PixelSeries::new(len, 1, pixels, values).unwrap(),
        }
    }

    #[test]
    fn test_frequency_axis_length() {
        // num_samples + 1 is always odd
        for num_samples in [2usize, 4, 10, 100] {
            let n = num_samples + 1;
            assert_eq!(rfft_frequencies(n, 0.1).len(), (num_samples + 1) / 2 + 1);
        }
        assert_eq!(rfft_frequencies(8, 1.0), vec![0.0, 0.125, 0.25, 0.375, 0.5]);
    }

    #[test]
    fn test_cosine_peaks_at_its_bin() {
        let n = 9;
        let bin = 2;
        let values: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * bin as f64 * i as f64 / n as f64).cos())
            .collect();
        let spectrum = transform_scan(&resampled(values, 1), 0.5).unwrap();

        assert_eq!(spectrum.bins(), 5);
        assert_eq!(spectrum.spectra.len(), 5);
        let magnitudes: Vec<f64> = spectrum.pixel(0, 0).iter().map(|c| c.norm()).collect();
        assert!((magnitudes[bin] - n as f64 / 2.0).abs() < 1e-9);
        for (k, m) in magnitudes.iter().enumerate() {
            if k != bin {
                assert!(*m < 1e-9, "bin {} has magnitude {}", k, m);
            }
        }
        assert!((spectrum.wavenumbers[bin] - bin as f64 / (n as f64 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_pixels_transform_independently() {
        let mut values = vec![1.0; 5];
        values.extend(vec![0.0; 5]);
        let spectrum = transform_scan(&resampled(values, 2), 1.0).unwrap();
        assert!((spectrum.pixel(0, 0)[0].re - 5.0).abs() < 1e-12);
        assert!(spectrum.pixel(0, 1).iter().all(|c| c.norm() < 1e-12));
    }

    #[test]
    fn test_non_positive_spacing_rejected() {
        let result = transform_scan(&resampled(vec![1.0; 3], 1), 0.0);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }
}
