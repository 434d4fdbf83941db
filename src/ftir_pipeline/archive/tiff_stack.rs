//! Multi-page 64-bit float TIFF, one page per frame.

use std::io::{Cursor, Read, Seek, Write};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};
use tracing::debug;

use crate::ftir_pipeline::archive::cube_codec::{CubeReader, CubeWriter};
use crate::ftir_pipeline::archive::types::TiffCompression;
use crate::ftir_pipeline::common::cube::FrameCube;
use crate::ftir_pipeline::common::error::{PipelineError, Result};

pub struct TiffStackCodec;

impl CubeWriter for TiffStackCodec {
    fn write_cube(&self, cube: &FrameCube, output: &mut dyn Write, compression: TiffCompression) -> Result<()> {
        if cube.frames() == 0 || cube.pixels() == 0 {
            return Err(PipelineError::EncodeError(format!(
                "cannot store an empty cube of {}x{}x{}",
                cube.frames(),
                cube.rows(),
                cube.cols()
            )));
        }
        debug!(
            "Encoding {} pages of {}x{} ({:?})",
            cube.frames(),
            cube.cols(),
            cube.rows(),
            compression
        );

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(compression.encoder_method());

        for f in 0..cube.frames() {
            encoder
                .write_image::<colortype::Gray64Float>(cube.cols() as u32, cube.rows() as u32, cube.frame(f))
                .map_err(|e| PipelineError::EncodeError(format!("page {}: {}", f, e)))?;
        }

        output.write_all(&buffer)?;
        Ok(())
    }
}

impl CubeReader for TiffStackCodec {
    fn read_cube<R: Read + Seek>(&self, input: R) -> Result<FrameCube> {
        let mut decoder = Decoder::new(input).map_err(|e| PipelineError::DecodeError(e.to_string()))?;
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

        let mut cube = FrameCube::empty(height as usize, width as usize);
        loop {
            let page = cube.frames();
            let dims = decoder
                .dimensions()
                .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
            if dims != (width, height) {
                return Err(PipelineError::DecodeError(format!(
                    "page {} is {}x{}, expected {}x{}",
                    page, dims.0, dims.1, width, height
                )));
            }

            match decoder
                .read_image()
                .map_err(|e| PipelineError::DecodeError(format!("page {}: {}", page, e)))?
            {
                DecodingResult::F64(values) => cube.push_frame(&values)?,
                _ => {
                    return Err(PipelineError::DecodeError(format!(
                        "page {} is not 64-bit float",
                        page
                    )));
                }
            }

            if !decoder.more_images() {
                break;
            }
            decoder
                .next_image()
                .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
        }

        debug!("Decoded {} pages of {}x{}", cube.frames(), width, height);
        Ok(cube)
    }
}
