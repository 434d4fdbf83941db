//! Processing and analysis configuration

use std::path::PathBuf;

use crate::ftir_pipeline::archive::TiffCompression;
use crate::ftir_pipeline::common::cube::Roi;
use crate::ftir_pipeline::interferogram::{DEFAULT_TRAVEL_MARGIN, ResampleParams, SamplingMode};
use crate::ftir_pipeline::position::DEFAULT_PROGRAM_RATE_HZ;
use crate::ftir_pipeline::seq::reindex::DEFAULT_LATE_RESET_THRESHOLD;
use crate::ftir_pipeline::spectrum::{BandEdges, WavelengthWindow};

/// Subframes per full frame on the instrument camera.
pub const DEFAULT_GANG: usize = 4;

/// HeNe wavelength in mm.
pub const HENE_WAVELENGTH_MM: f64 = 632.816e-6;

/// Configuration for turning raw recordings into a positioned dataset
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Ganging factor G, subframes per full frame
    pub gang: usize,
    /// Reset indices beyond this raise a late reset warning
    pub late_reset_threshold: usize,
    /// Root of the dark library; `None` skips dark subtraction
    pub dark_root: Option<PathBuf>,
    /// Control loop rate of the modulator log
    pub program_rate: f64,
    /// Compression for the archived frame cube and darks
    pub compression: TiffCompression,
    /// Restore an existing processed dataset instead of recomputing it
    pub restore_existing: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            gang: DEFAULT_GANG,
            late_reset_threshold: DEFAULT_LATE_RESET_THRESHOLD,
            dark_root: None,
            program_rate: DEFAULT_PROGRAM_RATE_HZ,
            compression: TiffCompression::DeflateFast,
            restore_existing: true,
        }
    }
}

impl ProcessingConfig {
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder::default()
    }
}

/// Builder for ProcessingConfig
#[derive(Default)]
pub struct ProcessingConfigBuilder {
    gang: Option<usize>,
    late_reset_threshold: Option<usize>,
    dark_root: Option<Option<PathBuf>>,
    program_rate: Option<f64>,
    compression: Option<TiffCompression>,
    restore_existing: Option<bool>,
}

impl ProcessingConfigBuilder {
    pub fn gang(mut self, gang: usize) -> Self {
        self.gang = Some(gang);
        self
    }

    pub fn late_reset_threshold(mut self, threshold: usize) -> Self {
        self.late_reset_threshold = Some(threshold);
        self
    }

    pub fn dark_root(mut self, root: Option<PathBuf>) -> Self {
        self.dark_root = Some(root);
        self
    }

    pub fn program_rate(mut self, rate: f64) -> Self {
        self.program_rate = Some(rate);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn restore_existing(mut self, restore: bool) -> Self {
        self.restore_existing = Some(restore);
        self
    }

    pub fn build(self) -> ProcessingConfig {
        let default = ProcessingConfig::default();
        ProcessingConfig {
            gang: self.gang.unwrap_or(default.gang),
            late_reset_threshold: self.late_reset_threshold.unwrap_or(default.late_reset_threshold),
            dark_root: self.dark_root.unwrap_or(default.dark_root),
            program_rate: self.program_rate.unwrap_or(default.program_rate),
            compression: self.compression.unwrap_or(default.compression),
            restore_existing: self.restore_existing.unwrap_or(default.restore_existing),
        }
    }
}

/// Spatial reduction applied before resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binning {
    None,
    /// Average non-overlapping `y x x` blocks
    Blocks { y: usize, x: usize },
    /// Average each frame to a single pixel
    FullFrame,
}

/// Configuration for scan segmentation, resampling and spectra
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Half of the stage travel accepted around the mean position, mm
    pub half_path_length: f64,
    /// OPD grid step, mm
    pub sample_size: f64,
    pub mode: SamplingMode,
    /// Fraction of the travel the grid spans
    pub margin: f64,
    /// Band kept after the transform; `None` keeps every bin
    pub window: Option<WavelengthWindow>,
    /// Rolling window in bins; `None` skips the SNR estimate
    pub snr_window: Option<usize>,
    pub roi: Option<Roi>,
    pub binning: Binning,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            half_path_length: 12.5,
            sample_size: HENE_WAVELENGTH_MM / 3.0,
            mode: SamplingMode::WhiteLight,
            margin: DEFAULT_TRAVEL_MARGIN,
            window: Some(WavelengthWindow::new(1.0, 1.7)),
            snr_window: Some(1000),
            roi: None,
            binning: Binning::None,
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    pub fn resample_params(&self) -> ResampleParams {
        ResampleParams {
            half_path_length: self.half_path_length,
            sample_size: self.sample_size,
            margin: self.margin,
            mode: self.mode,
        }
    }

    /// Grid step in cm, which puts the frequency axis in cm^-1.
    pub fn spacing_cm(&self) -> f64 {
        self.sample_size / 10.0
    }
}

/// Builder for AnalysisConfig
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    half_path_length: Option<f64>,
    sample_size: Option<f64>,
    mode: Option<SamplingMode>,
    margin: Option<f64>,
    window: Option<Option<WavelengthWindow>>,
    band_edges: Option<BandEdges>,
    snr_window: Option<Option<usize>>,
    roi: Option<Option<Roi>>,
    binning: Option<Binning>,
}

impl AnalysisConfigBuilder {
    pub fn half_path_length(mut self, mm: f64) -> Self {
        self.half_path_length = Some(mm);
        self
    }

    pub fn sample_size(mut self, mm: f64) -> Self {
        self.sample_size = Some(mm);
        self
    }

    pub fn mode(mut self, mode: SamplingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn window(mut self, window: Option<WavelengthWindow>) -> Self {
        self.window = Some(window);
        self
    }

    /// Edge convention applied to whichever window is configured.
    pub fn band_edges(mut self, edges: BandEdges) -> Self {
        self.band_edges = Some(edges);
        self
    }

    pub fn snr_window(mut self, bins: Option<usize>) -> Self {
        self.snr_window = Some(bins);
        self
    }

    pub fn roi(mut self, roi: Option<Roi>) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn binning(mut self, binning: Binning) -> Self {
        self.binning = Some(binning);
        self
    }

    pub fn build(self) -> AnalysisConfig {
        let default = AnalysisConfig::default();
        let mut window = self.window.unwrap_or(default.window);
        if let (Some(w), Some(edges)) = (window.as_mut(), self.band_edges) {
            w.edges = edges;
        }
        AnalysisConfig {
            half_path_length: self.half_path_length.unwrap_or(default.half_path_length),
            sample_size: self.sample_size.unwrap_or(default.sample_size),
            mode: self.mode.unwrap_or(default.mode),
            margin: self.margin.unwrap_or(default.margin),
            window,
            snr_window: self.snr_window.unwrap_or(default.snr_window),
            roi: self.roi.unwrap_or(default.roi),
            binning: self.binning.unwrap_or(default.binning),
        }
    }
}
