//! Maps the position log onto camera frame counters.

use tracing::debug;

use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::common::interp::{first_non_increasing, interp_at};
use crate::ftir_pipeline::position::types::PositionLog;

/// Interpolates one stage position per camera subframe.
///
/// Positions are piecewise linear in the log's counters; camera counters
/// outside the log take the nearest end value.
///
/// # Errors
///
/// * `InterpolationError` - the log is empty, its arrays disagree in length,
///   or its counters are not strictly increasing
pub fn interpolate_positions(camera_counters: &[i64], log: &PositionLog) -> Result<Vec<f64>> {
    if log.is_empty() {
        return Err(PipelineError::InterpolationError(
            "position log holds no samples".to_string(),
        ));
    }
    if log.counters.len() != log.positions.len() {
        return Err(PipelineError::InterpolationError(format!(
            "{} counters against {} positions",
            log.counters.len(),
            log.positions.len()
        )));
    }
    if let Some(i) = first_non_increasing(&log.counters) {
        return Err(PipelineError::InterpolationError(format!(
            "log counter {} at sample {} does not exceed {}",
            log.counters[i],
            i,
            log.counters[i - 1]
        )));
    }

    debug!(
        "Interpolating {} camera counters over {} log samples",
        camera_counters.len(),
        log.len()
    );
    Ok(camera_counters
        .iter()
        .map(|&c| interp_at(c as f64, &log.counters, &log.positions))
        .collect())
}
