//! Interferogram module
//!
//! Converts each scan's frame positions to optical path difference and
//! resamples every pixel onto an even, direction-aware OPD grid.

pub mod types;
pub mod resampler;
pub mod metric;

pub use types::{
    DEFAULT_TRAVEL_MARGIN, Direction, ResampleParams, ResampledScan, SamplingMode,
};
pub use resampler::{locate_zpd, opd_series, resample_pixel, resample_scan};
pub use metric::{ModulationSummary, modulation_summary};
