//! Wavelength band selection.

use std::ops::Range;

use realfft::num_complex::Complex64;

use crate::ftir_pipeline::common::cube::PixelSeries;
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::spectrum::types::{BandEdges, ScanSpectrum, WavelengthWindow};

/// Index range of the ascending wavenumber axis that falls inside `window`.
pub fn select_band(wavenumbers: &[f64], window: &WavelengthWindow) -> Result<Range<usize>> {
    if !(window.short_um > 0.0) || !(window.short_um < window.long_um) {
        return Err(PipelineError::InvalidParameter(format!(
            "wavelength window {}..{} um is not a positive increasing band",
            window.short_um, window.long_um
        )));
    }

    let (upper, lower) = window.wavenumber_bounds();
    let range = match window.edges {
        BandEdges::Exclusive => {
            wavenumbers.partition_point(|&f| f <= lower)..wavenumbers.partition_point(|&f| f < upper)
        }
        BandEdges::Inclusive => {
            wavenumbers.partition_point(|&f| f < lower)..wavenumbers.partition_point(|&f| f <= upper)
        }
    };

    if range.is_empty() {
        return Err(PipelineError::RangeError(format!(
            "no frequency bins between {:.3} and {:.3} cm^-1",
            lower, upper
        )));
    }
    Ok(range)
}

/// Keeps the part of one spectrum inside `window`, returning the kept
/// values and their wavenumbers.
pub fn filter_spectrum(
    spectrum: &[Complex64],
    wavenumbers: &[f64],
    window: &WavelengthWindow,
) -> Result<(Vec<Complex64>, Vec<f64>)> {
    if spectrum.len() != wavenumbers.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "{} spectrum bins against {} wavenumbers",
            spectrum.len(),
            wavenumbers.len()
        )));
    }
    let range = select_band(wavenumbers, window)?;
    Ok((spectrum[range.clone()].to_vec(), wavenumbers[range].to_vec()))
}

/// Restricts every pixel of a scan spectrum to `window`.
pub fn restrict_scan(spectrum: &ScanSpectrum, window: &WavelengthWindow) -> Result<ScanSpectrum> {
    let range = select_band(&spectrum.wavenumbers, window)?;
    let bins = range.len();
    let data: Vec<Complex64> = spectrum
        .spectra
        .iter()
        .flat_map(|pixel| pixel[range.clone()].iter().copied())
        .collect();

    Ok(ScanSpectrum {
        wavenumbers: spectrum.wavenumbers[range].to_vec(),
        spectra: PixelSeries::new(bins, spectrum.spectra.rows(), spectrum.spectra.cols(), data)?,
    })
}
