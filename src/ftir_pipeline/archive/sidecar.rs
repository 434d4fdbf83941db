//! JSON sidecar next to the image stack.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ftir_pipeline::common::error::{PipelineError, Result};

pub fn write_sidecar<T: Serialize>(value: &T, output: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(output, value).map_err(|e| PipelineError::EncodeError(e.to_string()))
}

pub fn read_sidecar<T: DeserializeOwned>(input: impl Read) -> Result<T> {
    serde_json::from_reader(input).map_err(|e| PipelineError::DecodeError(e.to_string()))
}
