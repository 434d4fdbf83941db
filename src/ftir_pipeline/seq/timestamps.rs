//! Synthetic per-subframe timestamps.
//!
//! The camera stamps each full frame with a millisecond-resolution clock, so
//! the `G` subframes of one full frame share a value. Over a whole recording
//! the elapsed time is known well enough to space subframes evenly.

use chrono::{DateTime, TimeDelta, Utc};

use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::seq::types::Subframe;

/// Nanoseconds between consecutive subframes of a recording, anchored on the
/// last subframe of the first full frame.
pub fn subframe_step_ns(first: DateTime<Utc>, last: DateTime<Utc>, count: usize, gang: usize) -> Result<f64> {
    validate(count, gang)?;
    let elapsed = (last - first)
        .num_nanoseconds()
        .ok_or_else(|| PipelineError::InvalidParameter("recording spans too long an interval".to_string()))?;
    Ok(elapsed as f64 / (count - (gang - 1)) as f64)
}

/// Assigns evenly spaced timestamps to every subframe of one recording.
///
/// `timestamp[i] = coarse[G-1] + step * (i - (G-1))`, so subframes before the
/// anchor get negative offsets.
pub fn stamp_subframes(subframes: &[Subframe], gang: usize) -> Result<Vec<DateTime<Utc>>> {
    if subframes.is_empty() {
        return Ok(Vec::new());
    }
    validate(subframes.len(), gang)?;

    let first = subframes[0].meta.coarse_timestamp;
    let last = subframes[subframes.len() - 1].meta.coarse_timestamp;
    let step = subframe_step_ns(first, last, subframes.len(), gang)?;

    let anchor_index = gang - 1;
    let anchor = subframes[anchor_index].meta.coarse_timestamp;

    Ok((0..subframes.len())
        .map(|i| {
            let offset = step * (i as f64 - anchor_index as f64);
            anchor + TimeDelta::nanoseconds(offset.round() as i64)
        })
        .collect())
}

fn validate(count: usize, gang: usize) -> Result<()> {
    if gang == 0 {
        return Err(PipelineError::InvalidParameter(
            "ganging factor must be at least 1".to_string(),
        ));
    }
    if count < gang {
        return Err(PipelineError::InvalidParameter(format!(
            "{} subframes cannot hold a full frame of {}",
            count, gang
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftir_pipeline::seq::fixtures::SyntheticSequence;
    use crate::ftir_pipeline::seq::{GangedSeqReader, SequenceReader};

    fn decoded(gang: usize, frames: usize, coarse: Vec<(i32, u16)>) -> Vec<Subframe> {
        let mut seq = SyntheticSequence::new(240, gang, frames);
        seq.coarse = coarse;
        GangedSeqReader
            .read_sequence(&seq.encode(), gang)
            .unwrap()
            .subframes
    }

    #[test]
    fn test_timestamps_strictly_increase_with_constant_step() {
        let coarse = vec![(100, 0), (100, 33), (100, 66), (100, 100), (100, 133)];
        let subs = decoded(4, 5, coarse);
        let stamps = stamp_subframes(&subs, 4).unwrap();

        // 133 ms over 20 - 3 intervals
        let step_ns = 133_000_000.0 / 17.0;
        assert_eq!(stamps.len(), 20);
        for w in stamps.windows(2) {
            let diff = (w[1] - w[0]).num_nanoseconds().unwrap() as f64;
            assert!(diff > 0.0);
            assert!((diff - step_ns).abs() <= 1.0, "diff {} vs step {}", diff, step_ns);
        }
    }

    #[test]
    fn test_anchor_keeps_its_coarse_value() {
        let coarse = vec![(200, 500), (201, 0)];
        let subs = decoded(2, 2, coarse);
        let stamps = stamp_subframes(&subs, 2).unwrap();

        let anchor = subs[1].meta.coarse_timestamp;
        assert_eq!(stamps[1], anchor);
        // index 0 sits one step before the anchor
        assert!(stamps[0] < anchor);
        let step = subframe_step_ns(subs[0].meta.coarse_timestamp, subs[3].meta.coarse_timestamp, 4, 2).unwrap();
        assert_eq!(step, 500_000_000.0 / 3.0);
        assert_eq!((anchor - stamps[0]).num_nanoseconds().unwrap(), step.round() as i64);
    }

    #[test]
    fn test_unganged_recording() {
        let coarse = vec![(0, 0), (0, 10), (0, 20)];
        let subs = decoded(1, 3, coarse);
        let stamps = stamp_subframes(&subs, 1).unwrap();
        let millis: Vec<i64> = stamps.iter().map(|t| t.timestamp_millis()).collect();
        // 20 ms spread over three samples
        assert_eq!(millis[0], 0);
        assert_eq!(stamps[1].timestamp_nanos_opt().unwrap(), 6_666_667);
    }

    #[test]
    fn test_zero_gang_rejected() {
        let epoch = DateTime::from_timestamp_millis(0).unwrap();
        assert!(matches!(
            subframe_step_ns(epoch, epoch, 4, 0),
            Err(PipelineError::InvalidParameter(_))
        ));
    }
}
