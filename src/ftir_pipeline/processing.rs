//! Dataset processing module
//!
//! Orchestrates the stages: recordings are decoded, stamped and concatenated,
//! counters reindexed, darks subtracted and positions attached. Analysis then
//! cuts the positioned series into scans and produces spectra per scan.

mod dataset_processor;
mod analysis;
pub mod types;

#[cfg(test)]
mod tests;

pub use dataset_processor::{CAMERA_DIR, DatasetProcessor, LOGS_DIR, PROCESSED_DIR};
pub use analysis::SpectralAnalysis;
pub use types::{
    AnalysisReport, CameraDataset, DatasetMetadata, FrameRecord, ProcessedDataset, ScanOutcome,
    ScanResult,
};
