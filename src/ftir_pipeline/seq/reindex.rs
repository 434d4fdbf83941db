//! Frame counter continuity across concatenated recordings.
//!
//! The camera's frame counter is reset to zero when the modulator log starts,
//! so the log and the camera share a counter origin from that subframe on.
//! Subframes recorded before the reset are renumbered to count up to it.

use serde::{Deserialize, Serialize};

/// Subframe index past which a reset is reported as suspiciously late.
pub const DEFAULT_LATE_RESET_THRESHOLD: usize = 100;

/// Diagnostic raised while reindexing. None of these stop processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentWarning {
    /// No subframe carries counter zero; counters are returned unchanged and
    /// alignment with the position log may be wrong.
    NoReset,
    /// The reset was found at `index`, beyond the late-reset threshold. Early
    /// recordings may be missing or corrupt.
    LateReset { index: usize },
}

/// Reindexed counters plus what was noticed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ReindexOutcome {
    pub counters: Vec<i64>,
    /// Index of the first zero counter, if any
    pub reset_index: Option<usize>,
    pub warnings: Vec<AlignmentWarning>,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameCounterReindexer {
    late_reset_threshold: usize,
}

impl Default for FrameCounterReindexer {
    fn default() -> Self {
        Self::new(DEFAULT_LATE_RESET_THRESHOLD)
    }
}

impl FrameCounterReindexer {
    pub fn new(late_reset_threshold: usize) -> Self {
        Self { late_reset_threshold }
    }

    /// Renumbers counters around the first zero at index `r`:
    /// `counter[i] = i` for `i < r` and `counter[i] + r` from `r` on.
    ///
    /// Counters that wrap before resetting are not detected; only a literal
    /// zero counts as a reset.
    pub fn reindex(&self, counters: &[i32]) -> ReindexOutcome {
        let original: Vec<i64> = counters.iter().map(|&c| c as i64).collect();

        let Some(reset) = counters.iter().position(|&c| c == 0) else {
            return ReindexOutcome {
                counters: original,
                reset_index: None,
                warnings: vec![AlignmentWarning::NoReset],
            };
        };

        let mut warnings = Vec::new();
        if reset > self.late_reset_threshold {
            warnings.push(AlignmentWarning::LateReset { index: reset });
        }

        let shift = reset as i64;
        let reindexed = original
            .iter()
            .enumerate()
            .map(|(i, &c)| if i < reset { i as i64 } else { c + shift })
            .collect();

        ReindexOutcome {
            counters: reindexed,
            reset_index: Some(reset),
            warnings,
        }
    }
}
