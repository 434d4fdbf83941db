//! Dark frame library and subtraction.
//!
//! Darks are kept per exposure time under `<root>/<exposure>/`, where the
//! exposure is the integration time in milliseconds rounded to three
//! decimals and written in its shortest form (`2.0`, `12.346`). The
//! directory holds dark `.seq` recordings and, once built, their median
//! frame as `darks_<exposure>.tiff`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::ftir_pipeline::archive::{CubeReader, CubeWriter, TiffCompression, TiffStackCodec};
use crate::ftir_pipeline::common::cube::FrameCube;
use crate::ftir_pipeline::common::error::{PipelineError, Result};

/// Library key for an integration time given in seconds.
pub fn exposure_key(integration_time_s: f32) -> String {
    let ms = (integration_time_s as f64 * 1e6).round() / 1e3;
    let mut key = ms.to_string();
    if !key.contains(['.', 'e', 'i', 'N']) {
        key.push_str(".0");
    }
    key
}

/// Per-pixel median over all frames, truncated toward zero. An even frame
/// count averages the two middle values first.
pub fn median_frame(cube: &FrameCube) -> Result<FrameCube> {
    if cube.frames() == 0 {
        return Err(PipelineError::InvalidParameter(
            "median of an empty dark set".to_string(),
        ));
    }

    let series = cube.to_pixel_series()?;
    let values: Vec<f64> = series
        .data()
        .par_chunks_exact(series.len())
        .map(|pixel| {
            let mut sorted = pixel.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            let median = if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            };
            median.trunc()
        })
        .collect();

    FrameCube::new(1, cube.rows(), cube.cols(), values)
}

/// Subtracts a single-frame dark from every frame of `cube`.
pub fn subtract_dark(cube: &mut FrameCube, dark: &FrameCube) -> Result<()> {
    if dark.frames() != 1 || dark.rows() != cube.rows() || dark.cols() != cube.cols() {
        return Err(PipelineError::InvalidParameter(format!(
            "dark of {}x{}x{} does not match {}x{} frames",
            dark.frames(),
            dark.rows(),
            dark.cols(),
            cube.rows(),
            cube.cols()
        )));
    }

    let dark = dark.frame(0);
    for f in 0..cube.frames() {
        for (v, d) in cube.frame_mut(f).iter_mut().zip(dark) {
            *v -= d;
        }
    }
    Ok(())
}

pub struct DarkLibrary {
    root: PathBuf,
    compression: TiffCompression,
}

impl DarkLibrary {
    pub fn new(root: impl Into<PathBuf>, compression: TiffCompression) -> Self {
        Self {
            root: root.into(),
            compression,
        }
    }

    pub fn exposure_dir(&self, exposure: &str) -> PathBuf {
        self.root.join(exposure)
    }

    pub fn dark_path(&self, exposure: &str) -> PathBuf {
        self.exposure_dir(exposure).join(format!("darks_{}.tiff", exposure))
    }

    /// Returns the stored dark for `exposure`, building it from the
    /// directory's recordings with `build` the first time. `None` when the
    /// library has no directory for this exposure.
    pub fn load_or_build<F>(&self, exposure: &str, build: F) -> Result<Option<FrameCube>>
    where
        F: FnOnce(&Path) -> Result<FrameCube>,
    {
        let dir = self.exposure_dir(exposure);
        if !dir.is_dir() {
            warn!(
                "No dark data for exposure {} ms under {}, continuing without dark subtraction",
                exposure,
                dir.display()
            );
            return Ok(None);
        }

        let path = self.dark_path(exposure);
        if path.is_file() {
            info!("Loading dark frame {}", path.display());
            let file = File::open(&path)
                .map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))?;
            return Ok(Some(TiffStackCodec.read_cube(BufReader::new(file))?));
        }

        info!("Creating median dark for exposure {} ms", exposure);
        let darks = build(&dir)?;
        let dark = median_frame(&darks)?;

        let mut file = File::create(&path)
            .map_err(|e| PipelineError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
        TiffStackCodec.write_cube(&dark, &mut file, self.compression)?;
        info!("Saved dark frame to {}", path.display());
        Ok(Some(dark))
    }
}
