//! Position log data types

use serde::{Deserialize, Serialize};

/// Header row at the start of the first modulator log file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulatorInfo {
    pub open_loop: f64,
    pub max_position: f64,
    pub sweep_length: f64,
    pub offset: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub tau: f64,
}

/// One control-loop sample of the modulator log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulatorLogRow {
    pub time: f64,
    pub utc_time: f64,
    pub step: f64,
    pub overruns: f64,
    pub set_point: f64,
    /// `position[0]` is the stage position in mm, `position[3]` the camera
    /// frame counter latched by the controller
    pub position: [f64; 4],
    pub controller_out: f64,
    pub voltage: f64,
}

impl ModulatorLogRow {
    pub const FIELDS: usize = 11;

    pub fn from_fields(v: &[f64; Self::FIELDS]) -> Self {
        Self {
            time: v[0],
            utc_time: v[1],
            step: v[2],
            overruns: v[3],
            set_point: v[4],
            position: [v[5], v[6], v[7], v[8]],
            controller_out: v[9],
            voltage: v[10],
        }
    }

    pub fn counter(&self) -> f64 {
        self.position[3]
    }

    pub fn stage_position(&self) -> f64 {
        self.position[0]
    }
}

/// `(counter, position)` samples from the external position log, plus the
/// UTC time of each sample reconstructed from the control-loop step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLog {
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f64_vec")]
    pub counters: Vec<f64>,
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f64_vec")]
    pub positions: Vec<f64>,
    #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f64_vec")]
    pub utc_times: Vec<f64>,
}

impl PositionLog {
    pub fn from_samples(counters: Vec<f64>, positions: Vec<f64>) -> Self {
        Self {
            counters,
            positions,
            utc_times: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// One sweep of the stage: subframes `start..=end` of the positioned series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    pub start: usize,
    /// Last in-band subframe, inclusive
    pub end: usize,
}

impl Scan {
    pub fn frame_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Half-open range over the subframes of this scan.
    pub fn frames(&self) -> std::ops::Range<usize> {
        self.start..self.end + 1
    }
}
