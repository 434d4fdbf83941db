use std::path::Path;

use tracing::{info, info_span, instrument, warn};

use crate::ftir_pipeline::archive::DatasetArchive;
use crate::ftir_pipeline::common::cube::FrameCube;
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::common::timing::PipelineTimings;
use crate::ftir_pipeline::config::ProcessingConfig;
use crate::ftir_pipeline::darks::{DarkLibrary, exposure_key, subtract_dark};
use crate::ftir_pipeline::position::{
    ModulatorLogReader, PositionLog, PositionSource, interpolate_positions,
};
use crate::ftir_pipeline::processing::types::{
    CameraDataset, DatasetMetadata, FrameRecord, ProcessedDataset,
};
use crate::ftir_pipeline::seq::{
    AlignmentWarning, FrameCounterReindexer, GangedSeqReader, Recording, ReindexOutcome,
    SequenceName, SequenceReader, stamp_subframes,
};

pub const CAMERA_DIR: &str = "Camera";
pub const LOGS_DIR: &str = "Logs";
pub const PROCESSED_DIR: &str = "Processed";

const SEQ_EXTENSION: &str = "seq";

/// Turns a dataset directory of camera recordings and a position log into a
/// positioned frame series.
pub struct DatasetProcessor<R: SequenceReader, L: PositionSource> {
    reader: R,
    positions: L,
    config: ProcessingConfig,
}

impl DatasetProcessor<GangedSeqReader, ModulatorLogReader> {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            reader: GangedSeqReader,
            positions: ModulatorLogReader::new(config.program_rate),
            config,
        }
    }
}

impl<R: SequenceReader, L: PositionSource> DatasetProcessor<R, L> {
    pub fn with_custom(reader: R, positions: L, config: ProcessingConfig) -> Self {
        Self {
            reader,
            positions,
            config,
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Decodes one recording and stamps its subframes.
    #[instrument(skip(self, data), fields(input_size = data.len()))]
    pub fn decode_recording(&self, data: &[u8], name: Option<SequenceName>) -> Result<Recording> {
        let sequence = {
            let _span = info_span!("decode_sequence").entered();
            self.reader.read_sequence(data, self.config.gang)?
        };

        let timestamps = {
            let _span = info_span!("stamp_subframes").entered();
            stamp_subframes(&sequence.subframes, sequence.gang)?
        };

        Ok(Recording {
            name,
            sequence,
            timestamps,
        })
    }

    pub fn read_recording_file(&self, path: &Path) -> Result<Recording> {
        let data = std::fs::read(path)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = match SequenceName::parse(&file_name) {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        info!("Reading {}", file_name);
        self.decode_recording(&data, name)
    }

    /// Decodes every `.seq` file in `dir`, in file name order.
    pub fn read_recording_dir(&self, dir: &Path) -> Result<Vec<Recording>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", dir.display(), e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == SEQ_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(PipelineError::InputReadError(format!(
                "no .seq recordings under {}",
                dir.display()
            )));
        }

        paths.iter().map(|p| self.read_recording_file(p)).collect()
    }

    /// Concatenates recordings into one dataset. With `detect_reset` the
    /// frame counters are reindexed around their reset and any alignment
    /// warnings are logged; without it they pass through unchanged.
    pub fn assemble(&self, recordings: Vec<Recording>, detect_reset: bool) -> Result<CameraDataset> {
        let Some(first) = recordings.first() else {
            return Err(PipelineError::InvalidParameter(
                "no recordings to assemble".to_string(),
            ));
        };
        let header = first.sequence.header.clone();
        let gang = first.sequence.gang;
        let rows = first.sequence.sub_rows();
        let cols = header.image_width as usize;

        let total: usize = recordings.iter().map(|r| r.sequence.subframes.len()).sum();
        let mut cube = FrameCube::empty(rows, cols);
        let mut meta = Vec::with_capacity(total);
        let mut timestamps = Vec::with_capacity(total);
        let mut names = Vec::with_capacity(recordings.len());

        for recording in recordings {
            let h = &recording.sequence.header;
            if h.image_width != header.image_width || h.image_height != header.image_height {
                return Err(PipelineError::FormatError(format!(
                    "recording of {}x{} does not match the dataset's {}x{}",
                    h.image_width, h.image_height, header.image_width, header.image_height
                )));
            }
            for subframe in recording.sequence.subframes {
                cube.push_frame(&subframe.image)?;
                meta.push(subframe.meta);
            }
            timestamps.extend(recording.timestamps);
            names.extend(recording.name);
        }

        let raw: Vec<i32> = meta.iter().map(|m| m.frame_counter).collect();
        let outcome = if detect_reset {
            let _span = info_span!("reindex").entered();
            let outcome = FrameCounterReindexer::new(self.config.late_reset_threshold).reindex(&raw);
            log_alignment(&outcome);
            outcome
        } else {
            ReindexOutcome {
                counters: raw.iter().map(|&c| c as i64).collect(),
                reset_index: None,
                warnings: Vec::new(),
            }
        };

        info!("Assembled {} subframes of {}x{}", cube.frames(), rows, cols);
        Ok(CameraDataset {
            header,
            gang,
            recordings: names,
            cube,
            meta,
            timestamps,
            counters: outcome.counters,
            reset_index: outcome.reset_index,
            warnings: outcome.warnings,
            dark_exposure: None,
        })
    }

    /// Subtracts the median dark matching the dataset's exposure, when a
    /// dark library is configured and holds one.
    pub fn subtract_darks(&self, camera: &mut CameraDataset) -> Result<()> {
        let (Some(root), Some(first)) = (&self.config.dark_root, camera.meta.first()) else {
            return Ok(());
        };
        let exposure = exposure_key(first.integration_time);
        let library = DarkLibrary::new(root, self.config.compression);

        let dark = library.load_or_build(&exposure, |dir| {
            let recordings = self.read_recording_dir(dir)?;
            Ok(self.assemble(recordings, false)?.cube)
        })?;

        if let Some(dark) = dark {
            info!("Subtracting dark frame for exposure {} ms", exposure);
            subtract_dark(&mut camera.cube, &dark)?;
            camera.dark_exposure = Some(exposure);
        }
        Ok(())
    }

    /// Gives every subframe its stage position from the log.
    pub fn attach_positions(&self, camera: CameraDataset, log: PositionLog, name: &str) -> Result<ProcessedDataset> {
        let positions = {
            let _span = info_span!("interpolate_positions").entered();
            interpolate_positions(&camera.counters, &log)?
        };

        let frames = camera
            .meta
            .into_iter()
            .zip(camera.timestamps)
            .zip(camera.counters)
            .zip(positions)
            .map(|(((meta, timestamp), counter), position)| FrameRecord {
                meta,
                timestamp,
                counter,
                position,
            })
            .collect();

        Ok(ProcessedDataset {
            cube: camera.cube,
            metadata: DatasetMetadata {
                name: name.to_string(),
                header: camera.header,
                gang: camera.gang,
                recordings: camera.recordings,
                reset_index: camera.reset_index,
                warnings: camera.warnings,
                dark_exposure: camera.dark_exposure,
                frames,
                position_log: log,
            },
        })
    }

    /// Processes `<dataset>/Camera` and `<dataset>/Logs`, saving the result
    /// under `<dataset>/Processed`. An existing processed dataset is
    /// restored instead when the configuration allows it.
    #[instrument(skip(self, dataset_dir), fields(dataset = %dataset_dir.display()))]
    pub fn process_dir(&self, dataset_dir: &Path) -> Result<ProcessedDataset> {
        let name = dataset_name(dataset_dir)?;
        let processed_dir = dataset_dir.join(PROCESSED_DIR);
        let archive = DatasetArchive::new(self.config.compression);

        if self.config.restore_existing && archive.exists(&processed_dir, &name) {
            info!("Restoring processed dataset {}", name);
            return archive.load(&processed_dir, &name);
        }

        let mut timings = PipelineTimings::new();
        let log = timings.time("read_position_log", || {
            let _span = info_span!("read_position_log").entered();
            self.positions.read_positions(&dataset_dir.join(LOGS_DIR))
        })?;
        let recordings = timings.time("decode", || self.read_recording_dir(&dataset_dir.join(CAMERA_DIR)))?;
        let mut camera = timings.time("assemble", || self.assemble(recordings, true))?;
        timings.time("darks", || {
            let _span = info_span!("darks").entered();
            self.subtract_darks(&mut camera)
        })?;
        let dataset = timings.time("interpolate", || self.attach_positions(camera, log, &name))?;
        timings.time("save", || archive.save(&processed_dir, &dataset))?;

        timings.log_summary();
        Ok(dataset)
    }

    /// Loads a dataset saved by [`Self::process_dir`].
    pub fn restore(&self, dataset_dir: &Path) -> Result<ProcessedDataset> {
        let name = dataset_name(dataset_dir)?;
        DatasetArchive::new(self.config.compression).load(&dataset_dir.join(PROCESSED_DIR), &name)
    }
}

fn dataset_name(dataset_dir: &Path) -> Result<String> {
    dataset_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            PipelineError::InvalidParameter(format!("{} names no dataset", dataset_dir.display()))
        })
}

fn log_alignment(outcome: &ReindexOutcome) {
    if let Some(index) = outcome.reset_index {
        info!("Frame counter reset found at subframe {}", index);
    }
    for warning in &outcome.warnings {
        match warning {
            AlignmentWarning::NoReset => {
                warn!("No frame counter reset found, alignment with the position log may be wrong")
            }
            AlignmentWarning::LateReset { index } => warn!(
                "Frame counter reset found late at subframe {}, early recordings may be missing or corrupt",
                index
            ),
        }
    }
}
