//! Common utilities module
//!
//! This module contains shared types and helpers used across the pipeline stages.

pub mod error;
pub mod cube;
pub mod float_serde;
pub mod interp;
pub mod timing;

pub use error::{PipelineError, Result};
pub use cube::{FrameCube, PixelSeries, Roi};
pub use timing::{PipelineTimings, StepTiming, Timer};
