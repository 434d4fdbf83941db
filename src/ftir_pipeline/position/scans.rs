//! Splits a positioned series into individual sweeps of the stage.

use tracing::info;

use crate::ftir_pipeline::common::interp::mean;
use crate::ftir_pipeline::position::types::Scan;

/// Finds the sweeps that stay within `half_path` of the mean position.
///
/// Subframes inside `[mean - half_path, mean + half_path]` are accepted, and
/// every maximal run of consecutive accepted indices becomes one [`Scan`].
/// Scans come out ordered by start index and never overlap.
pub fn segment_scans(positions: &[f64], half_path: f64) -> Vec<Scan> {
    let centre = mean(positions);
    let lower = centre - half_path;
    let upper = centre + half_path;

    let mut scans: Vec<Scan> = Vec::new();
    for (i, &p) in positions.iter().enumerate() {
        if !(p >= lower && p <= upper) {
            continue;
        }
        match scans.last_mut() {
            Some(scan) if scan.end + 1 == i => scan.end = i,
            _ => scans.push(Scan { start: i, end: i }),
        }
    }

    info!("Data separated into {} scans", scans.len());
    scans
}
