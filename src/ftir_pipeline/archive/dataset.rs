//! Save and restore of a processed dataset.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{info, instrument};

use crate::ftir_pipeline::archive::cube_codec::{CubeReader, CubeWriter};
use crate::ftir_pipeline::archive::sidecar::{read_sidecar, write_sidecar};
use crate::ftir_pipeline::archive::tiff_stack::TiffStackCodec;
use crate::ftir_pipeline::archive::types::{ArchiveNames, TiffCompression};
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::processing::types::{DatasetMetadata, ProcessedDataset};

/// Frame cube as a TIFF stack, everything else as a JSON sidecar.
pub struct DatasetArchive<C: CubeWriter + CubeReader> {
    codec: C,
    compression: TiffCompression,
}

impl DatasetArchive<TiffStackCodec> {
    pub fn new(compression: TiffCompression) -> Self {
        Self {
            codec: TiffStackCodec,
            compression,
        }
    }
}

impl<C: CubeWriter + CubeReader> DatasetArchive<C> {
    pub fn with_codec(codec: C, compression: TiffCompression) -> Self {
        Self { codec, compression }
    }

    /// Whether `dir` already holds an archive of `name`.
    pub fn exists(&self, dir: &Path, name: &str) -> bool {
        let names = ArchiveNames::for_dataset(name);
        dir.join(names.cube).is_file() && dir.join(names.sidecar).is_file()
    }

    #[instrument(skip(self, dataset), fields(frames = dataset.cube.frames()))]
    pub fn save(&self, dir: &Path, dataset: &ProcessedDataset) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| PipelineError::OutputWriteError(format!("{}: {}", dir.display(), e)))?;
        let names = ArchiveNames::for_dataset(&dataset.metadata.name);

        let cube_path = dir.join(&names.cube);
        let mut cube_file = File::create(&cube_path)
            .map_err(|e| PipelineError::OutputWriteError(format!("{}: {}", cube_path.display(), e)))?;
        self.codec.write_cube(&dataset.cube, &mut cube_file, self.compression)?;

        let sidecar_path = dir.join(&names.sidecar);
        let mut sidecar_file = File::create(&sidecar_path)
            .map_err(|e| PipelineError::OutputWriteError(format!("{}: {}", sidecar_path.display(), e)))?;
        write_sidecar(&dataset.metadata, &mut sidecar_file)?;

        info!(output = %dir.display(), "Processed dataset saved");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn load(&self, dir: &Path, name: &str) -> Result<ProcessedDataset> {
        let names = ArchiveNames::for_dataset(name);

        let cube_path = dir.join(&names.cube);
        let cube_file = File::open(&cube_path)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", cube_path.display(), e)))?;
        let cube = self.codec.read_cube(BufReader::new(cube_file))?;

        let sidecar_path = dir.join(&names.sidecar);
        let sidecar_file = File::open(&sidecar_path)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", sidecar_path.display(), e)))?;
        let metadata: DatasetMetadata = read_sidecar(BufReader::new(sidecar_file))?;

        if metadata.frames.len() != cube.frames() {
            return Err(PipelineError::DecodeError(format!(
                "sidecar describes {} frames but the stack holds {}",
                metadata.frames.len(),
                cube.frames()
            )));
        }
        info!(frames = cube.frames(), "Processed dataset restored");
        Ok(ProcessedDataset { cube, metadata })
    }
}
