use std::io::{Read, Seek, Write};

use crate::ftir_pipeline::archive::types::TiffCompression;
use crate::ftir_pipeline::common::cube::FrameCube;
use crate::ftir_pipeline::common::error::Result;

/// Stores a frame cube as a stack of images.
pub trait CubeWriter {
    fn write_cube(&self, cube: &FrameCube, output: &mut dyn Write, compression: TiffCompression) -> Result<()>;
}

pub trait CubeReader {
    fn read_cube<R: Read + Seek>(&self, input: R) -> Result<FrameCube>;
}
