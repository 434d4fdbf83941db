//! Camera sequence module
//!
//! Decoding of ganged `.seq` recordings, synthetic subframe timestamps and
//! frame counter reindexing across a dataset.

mod reader;
mod ganged_reader;
pub mod types;
pub mod timestamps;
pub mod reindex;

#[cfg(test)]
pub(crate) mod fixtures;

pub use reader::SequenceReader;
pub use ganged_reader::{GangedSeqReader, parse_header, parse_meta_row};
pub use types::{
    DecodedSequence, FpaClock, FrameMeta, Recording, SequenceHeader, SequenceName, Subframe,
};
pub use timestamps::{stamp_subframes, subframe_step_ns};
pub use reindex::{AlignmentWarning, FrameCounterReindexer, ReindexOutcome};
