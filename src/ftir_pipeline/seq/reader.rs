use crate::ftir_pipeline::common::error::Result;
use crate::ftir_pipeline::seq::types::DecodedSequence;

pub trait SequenceReader {
    /// Decodes one recording whose full frames each hold `gang` subframes.
    fn read_sequence(&self, data: &[u8], gang: usize) -> Result<DecodedSequence>;
}
