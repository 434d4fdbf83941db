//! Interferometer processing pipeline module
//!
//! Stages run leaf first: `seq` decodes and stamps recordings, `position`
//! places every subframe on the stage, `interferogram` resamples each scan
//! onto an even OPD grid and `spectrum` transforms it. `processing` wires
//! the stages together over a dataset directory.

pub mod common;
pub mod seq;
pub mod position;
pub mod interferogram;
pub mod spectrum;
pub mod darks;
pub mod archive;
pub mod config;
pub mod processing;

pub use common::{
    PipelineError,
    Result,
};

pub use config::{
    AnalysisConfig,
    AnalysisConfigBuilder,
    Binning,
    ProcessingConfig,
    ProcessingConfigBuilder,
};

pub use archive::{
    DatasetArchive,
    TiffCompression,
};

pub use processing::{
    AnalysisReport,
    DatasetProcessor,
    ProcessedDataset,
    SpectralAnalysis,
};
