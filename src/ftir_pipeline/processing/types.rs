//! Stage outputs of dataset processing and analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ftir_pipeline::common::cube::{FrameCube, PixelSeries};
use crate::ftir_pipeline::common::error::Result;
use crate::ftir_pipeline::common::timing::PipelineTimings;
use crate::ftir_pipeline::interferogram::{ModulationSummary, ResampledScan};
use crate::ftir_pipeline::position::{PositionLog, Scan};
use crate::ftir_pipeline::seq::{AlignmentWarning, FrameMeta, SequenceHeader, SequenceName};
use crate::ftir_pipeline::spectrum::ScanSpectrum;

/// Every recording of a dataset concatenated in name order, with counters
/// reindexed against the reset.
#[derive(Debug, Clone)]
pub struct CameraDataset {
    pub header: SequenceHeader,
    pub gang: usize,
    pub recordings: Vec<SequenceName>,
    pub cube: FrameCube,
    pub meta: Vec<FrameMeta>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub counters: Vec<i64>,
    pub reset_index: Option<usize>,
    pub warnings: Vec<AlignmentWarning>,
    /// Library key of the dark subtracted from `cube`, if any
    pub dark_exposure: Option<String>,
}

/// Everything known about one subframe once it has a stage position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub meta: FrameMeta,
    pub timestamp: DateTime<Utc>,
    /// Reindexed frame counter
    pub counter: i64,
    /// Stage position, mm
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f64")]
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub name: String,
    pub header: SequenceHeader,
    pub gang: usize,
    pub recordings: Vec<SequenceName>,
    pub reset_index: Option<usize>,
    pub warnings: Vec<AlignmentWarning>,
    pub dark_exposure: Option<String>,
    pub frames: Vec<FrameRecord>,
    pub position_log: PositionLog,
}

/// A dataset ready for analysis: one cube frame per [`FrameRecord`].
#[derive(Debug, Clone)]
pub struct ProcessedDataset {
    pub cube: FrameCube,
    pub metadata: DatasetMetadata,
}

impl ProcessedDataset {
    pub fn positions(&self) -> Vec<f64> {
        self.metadata.frames.iter().map(|f| f.position).collect()
    }

    pub fn len(&self) -> usize {
        self.metadata.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.frames.is_empty()
    }
}

/// Interferograms and spectra of one scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub scan: Scan,
    pub modulation: ModulationSummary,
    pub resampled: ResampledScan,
    pub spectrum: ScanSpectrum,
    /// `spectrum` restricted to the configured wavelength window
    pub band: Option<ScanSpectrum>,
    /// Per pixel SNR of `band`, or of `spectrum` without a window
    pub snr: Option<PixelSeries>,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub scan: Scan,
    pub result: Result<ScanResult>,
}

#[derive(Debug)]
pub struct AnalysisReport {
    pub outcomes: Vec<ScanOutcome>,
    pub timings: PipelineTimings,
}

impl AnalysisReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ScanResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}
