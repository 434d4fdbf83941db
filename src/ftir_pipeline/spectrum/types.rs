//! Spectral data types

use realfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::ftir_pipeline::common::cube::PixelSeries;

/// Whether bins sitting exactly on a wavelength bound are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandEdges {
    /// Keep `wn2 < f < wn1`
    Exclusive,
    /// Keep `wn2 <= f <= wn1`
    Inclusive,
}

/// Wavelength band of interest in microns, `short_um < long_um`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthWindow {
    pub short_um: f64,
    pub long_um: f64,
    pub edges: BandEdges,
}

impl WavelengthWindow {
    pub fn new(short_um: f64, long_um: f64) -> Self {
        Self {
            short_um,
            long_um,
            edges: BandEdges::Exclusive,
        }
    }

    pub fn with_edges(mut self, edges: BandEdges) -> Self {
        self.edges = edges;
        self
    }

    /// Wavenumber bounds in cm^-1 as `(upper, lower)`; the short wavelength
    /// gives the larger wavenumber.
    pub fn wavenumber_bounds(&self) -> (f64, f64) {
        (microns_to_wavenumber(self.short_um), microns_to_wavenumber(self.long_um))
    }
}

/// `1 / (um * 1e-4)`, microns to cm^-1.
pub fn microns_to_wavenumber(um: f64) -> f64 {
    1.0 / (um * 1e-4)
}

/// Spectra of every pixel in one scan over a shared wavenumber axis.
#[derive(Debug, Clone)]
pub struct ScanSpectrum {
    /// Non-negative wavenumbers, cm^-1, ascending
    pub wavenumbers: Vec<f64>,
    pub spectra: PixelSeries<Complex64>,
}

impl ScanSpectrum {
    pub fn bins(&self) -> usize {
        self.wavenumbers.len()
    }

    pub fn pixel(&self, y: usize, x: usize) -> &[Complex64] {
        self.spectra.at(y, x)
    }
}
