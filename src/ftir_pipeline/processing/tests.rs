use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::DateTime;

use crate::ftir_pipeline::common::cube::FrameCube;
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::config::{AnalysisConfig, Binning, ProcessingConfig};
use crate::ftir_pipeline::interferogram::{Direction, SamplingMode};
use crate::ftir_pipeline::position::{PositionLog, PositionSource, Scan};
use crate::ftir_pipeline::processing::{
    CAMERA_DIR, DatasetProcessor, LOGS_DIR, PROCESSED_DIR, ProcessedDataset, SpectralAnalysis,
};
use crate::ftir_pipeline::seq::fixtures::{MetaRow, SyntheticSequence};
use crate::ftir_pipeline::seq::{
    AlignmentWarning, DecodedSequence, FpaClock, FrameMeta, GangedSeqReader, SequenceHeader,
    SequenceReader, Subframe,
};

struct MockReader {
    should_fail: bool,
    counters: Vec<i32>,
}

impl SequenceReader for MockReader {
    fn read_sequence(&self, _data: &[u8], gang: usize) -> Result<DecodedSequence> {
        if self.should_fail {
            return Err(PipelineError::FormatError("Mock decode error".to_string()));
        }
        let subframes = self
            .counters
            .iter()
            .enumerate()
            .map(|(i, &c)| Subframe {
                rows: 1,
                cols: 2,
                image: vec![i as i16, -(i as i16)],
                meta: meta(c, i as i64),
            })
            .collect::<Vec<_>>();
        Ok(DecodedSequence {
            header: SequenceHeader {
                image_width: 2,
                image_height: (2 * gang) as u32,
                bit_depth: 16,
                bit_depth_true: 14,
                image_size_bytes: 0,
                num_frames: (subframes.len() / gang) as u32,
                true_image_size: 0,
            },
            gang,
            subframes,
        })
    }
}

struct MockPositions {
    log: PositionLog,
    requested: Arc<Mutex<Vec<PathBuf>>>,
}

impl PositionSource for MockPositions {
    fn read_positions(&self, log_dir: &Path) -> Result<PositionLog> {
        self.requested.lock().unwrap().push(log_dir.to_path_buf());
        Ok(self.log.clone())
    }
}

fn meta(frame_counter: i32, second: i64) -> FrameMeta {
    FrameMeta {
        part_number: "PN".to_string(),
        serial_number: "SN".to_string(),
        fpa_type: "FPA".to_string(),
        crc: 0,
        frame_counter,
        frame_time: 0.01,
        integration_time: 0.002,
        frequency: 100.0,
        board_temperature: 30.0,
        raw_nuc: 0,
        col_offset: 0,
        num_cols: 2,
        row_offset: 0,
        num_rows: 1,
        integration_ticks: 0,
        fpa_clock: FpaClock::default(),
        fpa_temperature: -40.0,
        coarse_timestamp: DateTime::from_timestamp(1_741_100_000 + second, 0).unwrap(),
    }
}

fn mock_processor(counters: Vec<i32>, log: PositionLog) -> DatasetProcessor<MockReader, MockPositions> {
    let reader = MockReader {
        should_fail: false,
        counters,
    };
    let positions = MockPositions {
        log,
        requested: Arc::new(Mutex::new(Vec::new())),
    };
    DatasetProcessor::with_custom(reader, positions, ProcessingConfig::builder().gang(2).build())
}

#[test]
fn test_reader_failure_propagates() {
    let reader = MockReader {
        should_fail: true,
        counters: Vec::new(),
    };
    let positions = MockPositions {
        log: PositionLog::default(),
        requested: Arc::new(Mutex::new(Vec::new())),
    };
    let processor = DatasetProcessor::with_custom(reader, positions, ProcessingConfig::default());

    let result = processor.decode_recording(b"fake seq data", None);
    assert!(matches!(result, Err(PipelineError::FormatError(_))));
}

#[test]
fn test_assemble_reindexes_across_recordings() {
    let first = mock_processor(vec![5, 6, 7, 8], PositionLog::default());
    let second = mock_processor(vec![0, 1, 2, 3], PositionLog::default());
    let recordings = vec![
        first.decode_recording(b"a", None).unwrap(),
        second.decode_recording(b"b", None).unwrap(),
    ];

    let camera = first.assemble(recordings, true).unwrap();
    assert_eq!(camera.cube.frames(), 8);
    assert_eq!(camera.timestamps.len(), 8);
    assert_eq!(camera.counters, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(camera.reset_index, Some(4));
    assert!(camera.warnings.is_empty());
}

#[test]
fn test_assemble_without_reset_detection() {
    let processor = mock_processor(vec![5, 6, 7, 8], PositionLog::default());
    let recording = processor.decode_recording(b"a", None).unwrap();

    let camera = processor.assemble(vec![recording.clone()], false).unwrap();
    assert_eq!(camera.counters, vec![5, 6, 7, 8]);
    assert!(camera.warnings.is_empty());

    let camera = processor.assemble(vec![recording], true).unwrap();
    assert_eq!(camera.counters, vec![5, 6, 7, 8]);
    assert_eq!(camera.warnings, vec![AlignmentWarning::NoReset]);
}

#[test]
fn test_assemble_nothing_is_an_error() {
    let processor = mock_processor(Vec::new(), PositionLog::default());
    assert!(matches!(
        processor.assemble(Vec::new(), true),
        Err(PipelineError::InvalidParameter(_))
    ));
}

#[test]
fn test_attach_positions_builds_frame_records() {
    let log = PositionLog::from_samples(vec![0.0, 10.0], vec![0.0, 5.0]);
    let processor = mock_processor(vec![0, 1, 2, 3], log);
    let recording = processor.decode_recording(b"a", None).unwrap();
    let camera = processor.assemble(vec![recording], true).unwrap();

    let log = PositionLog::from_samples(vec![0.0, 10.0], vec![0.0, 5.0]);
    let dataset = processor.attach_positions(camera, log, "run").unwrap();
    assert_eq!(dataset.positions(), vec![0.0, 0.5, 1.0, 1.5]);
    assert_eq!(dataset.metadata.frames[2].counter, 2);
    assert_eq!(dataset.metadata.name, "run");
    assert_eq!(dataset.len(), dataset.cube.frames());
}

#[test]
fn test_attach_positions_rejects_bad_log() {
    let processor = mock_processor(vec![0, 1], PositionLog::default());
    let recording = processor.decode_recording(b"a", None).unwrap();
    let camera = processor.assemble(vec![recording], true).unwrap();

    let log = PositionLog::from_samples(vec![0.0, 0.0], vec![1.0, 2.0]);
    assert!(matches!(
        processor.attach_positions(camera, log, "run"),
        Err(PipelineError::InterpolationError(_))
    ));
}

fn write_dataset(root: &Path, frames: usize) -> PathBuf {
    let dataset = root.join("run_01");
    std::fs::create_dir_all(dataset.join(CAMERA_DIR)).unwrap();
    std::fs::create_dir_all(dataset.join(LOGS_DIR)).unwrap();
    let seq = SyntheticSequence::new(240, 4, frames);
    std::fs::write(
        dataset.join(CAMERA_DIR).join("lab_camera_2025_03_04_12_00_00.seq"),
        seq.encode(),
    )
    .unwrap();
    dataset
}

fn ganged_processor(
    config: ProcessingConfig,
    requested: Arc<Mutex<Vec<PathBuf>>>,
) -> DatasetProcessor<GangedSeqReader, MockPositions> {
    let positions = MockPositions {
        log: PositionLog::from_samples(vec![0.0, 7.0], vec![0.1, 7.3]),
        requested,
    };
    DatasetProcessor::with_custom(GangedSeqReader, positions, config)
}

#[test]
fn test_process_dir_saves_then_restores() {
    let root = tempfile::tempdir().unwrap();
    let dataset_dir = write_dataset(root.path(), 2);
    let requested = Arc::new(Mutex::new(Vec::new()));
    let processor = ganged_processor(ProcessingConfig::default(), requested.clone());

    let processed = processor.process_dir(&dataset_dir).unwrap();
    assert_eq!(processed.cube.frames(), 8);
    assert_eq!((processed.cube.rows(), processed.cube.cols()), (3, 240));
    for (i, p) in processed.positions().iter().enumerate() {
        assert!((p - (0.1 + 7.2 * i as f64 / 7.0)).abs() < 1e-12, "frame {}", i);
    }
    assert_eq!(processed.metadata.recordings[0].camera, "lab");
    assert_eq!(processed.metadata.reset_index, Some(0));
    assert!(processed.metadata.dark_exposure.is_none());
    assert_eq!(
        processed.cube.get(5, 1, 3),
        SyntheticSequence::pixel_value(1, 1, 1, 3) as f64
    );
    assert!(dataset_dir.join(PROCESSED_DIR).join("run_01_processed_data.tiff").is_file());
    assert_eq!(requested.lock().unwrap().as_slice(), &[dataset_dir.join(LOGS_DIR)]);

    let restored = processor.process_dir(&dataset_dir).unwrap();
    assert_eq!(requested.lock().unwrap().len(), 1);
    assert_eq!(restored.cube, processed.cube);
    assert_eq!(restored.metadata, processed.metadata);
    let bits = |d: &ProcessedDataset| d.positions().iter().map(|p| p.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&restored), bits(&processed));
    assert_eq!(processor.restore(&dataset_dir).unwrap().metadata, processed.metadata);
}

#[test]
fn test_process_dir_without_recordings() {
    let root = tempfile::tempdir().unwrap();
    let dataset_dir = root.path().join("empty");
    std::fs::create_dir_all(dataset_dir.join(CAMERA_DIR)).unwrap();
    let processor = ganged_processor(ProcessingConfig::default(), Arc::new(Mutex::new(Vec::new())));

    assert!(matches!(
        processor.process_dir(&dataset_dir),
        Err(PipelineError::InputReadError(_))
    ));
}

#[test]
fn test_process_dir_subtracts_median_dark() {
    let root = tempfile::tempdir().unwrap();
    let dataset_dir = write_dataset(root.path(), 2);

    // one full frame of four subframes, exposure 2 ms
    let dark_root = root.path().join("darks");
    let dark_dir = dark_root.join("2.0");
    std::fs::create_dir_all(&dark_dir).unwrap();
    let mut dark = SyntheticSequence::new(240, 4, 1);
    dark.meta = vec![MetaRow::default(); 4];
    std::fs::write(dark_dir.join("dark.seq"), dark.encode()).unwrap();

    let config = ProcessingConfig::builder()
        .dark_root(Some(dark_root))
        .restore_existing(false)
        .build();
    let processor = ganged_processor(config, Arc::new(Mutex::new(Vec::new())));
    let processed = processor.process_dir(&dataset_dir).unwrap();

    // dark median per pixel is the mean of subframes 1 and 2
    assert_eq!(processed.metadata.dark_exposure.as_deref(), Some("2.0"));
    for (y, x) in [(0, 0), (2, 17), (1, 239)] {
        assert_eq!(processed.cube.get(0, y, x), -150.0);
    }
    assert!(dark_dir.join("darks_2.0.tiff").is_file());
}

fn sweep_cube(positions: &[f64]) -> FrameCube {
    let mut data = Vec::new();
    for &p in positions {
        for pixel in 0..4 {
            data.push(100.0 + pixel as f64 + p.cos());
        }
    }
    FrameCube::new(positions.len(), 2, 2, data).unwrap()
}

fn sweep_positions() -> Vec<f64> {
    let mut positions: Vec<f64> = (0..=10).map(|p| p as f64).collect();
    positions.push(100.0);
    positions.extend((0..=10).rev().map(|p| p as f64));
    positions
}

fn sweep_config() -> AnalysisConfig {
    AnalysisConfig::builder()
        .half_path_length(10.0)
        .sample_size(1.0)
        .mode(SamplingMode::Laser)
        .window(None)
        .snr_window(Some(3))
        .build()
}

#[test]
fn test_analysis_per_scan_spectra() {
    let positions = sweep_positions();
    let analysis = SpectralAnalysis::new(sweep_config());
    let report = analysis.run(&positions, &sweep_cube(&positions)).unwrap();

    let scans: Vec<Scan> = report.outcomes.iter().map(|o| o.scan).collect();
    assert_eq!(scans, vec![Scan { start: 0, end: 10 }, Scan { start: 12, end: 22 }]);
    assert_eq!(report.failed(), 0);

    let results: Vec<_> = report.succeeded().collect();
    assert_eq!(results[0].resampled.direction, Direction::Positive);
    assert_eq!(results[1].resampled.direction, Direction::Negative);
    for result in results {
        // 2 * 10 * 0.9 = 18 intervals, 19 grid points
        assert_eq!(result.resampled.grid_len(), 19);
        assert_eq!(result.spectrum.bins(), 10);
        assert_eq!(result.spectrum.spectra.pixels(), 4);
        assert!(result.band.is_none());
        let snr = result.snr.as_ref().unwrap();
        assert_eq!(snr.len(), 10);
        assert!(snr.pixel(0)[..2].iter().all(|v| v.is_nan()));
        assert!(result.modulation.ratio > 0.0);
    }
}

#[test]
fn test_failed_band_is_reported_per_scan() {
    let positions = sweep_positions();
    let config = AnalysisConfig {
        window: AnalysisConfig::default().window,
        ..sweep_config()
    };
    let report = SpectralAnalysis::new(config)
        .run(&positions, &sweep_cube(&positions))
        .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failed(), 2);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.result, Err(PipelineError::RangeError(_)))));
}

#[test]
fn test_failed_scan_leaves_other_scans_intact() {
    // mean is 70 / 14 = 5, so the band is [-5, 15] and the lone 5.0
    // between the two excursions forms a one-frame scan
    let mut positions: Vec<f64> = (0..=10).map(|p| p as f64).collect();
    positions.extend([100.0, 5.0, -90.0]);
    let cube = sweep_cube(&positions);

    let report = SpectralAnalysis::new(sweep_config()).run(&positions, &cube).unwrap();
    let scans: Vec<Scan> = report.outcomes.iter().map(|o| o.scan).collect();
    assert_eq!(scans, vec![Scan { start: 0, end: 10 }, Scan { start: 12, end: 12 }]);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcomes[1].result,
        Err(PipelineError::InvalidParameter(_))
    ));

    let good = report.outcomes[0].result.as_ref().unwrap();
    let alone = SpectralAnalysis::new(sweep_config())
        .run(&positions[..11], &sweep_cube(&positions[..11]))
        .unwrap();
    let reference = alone.outcomes[0].result.as_ref().unwrap();
    assert_eq!(good.resampled.direction, Direction::Positive);
    assert_eq!(good.resampled.grid_len(), 19);
    assert_eq!(good.spectrum.bins(), 10);
    assert_eq!(good.snr.as_ref().unwrap().len(), 10);
    assert_eq!(good.resampled.intensity, reference.resampled.intensity);
    assert_eq!(good.spectrum.spectra, reference.spectrum.spectra);
}

#[test]
fn test_analysis_binning_and_roi() {
    let positions = sweep_positions();
    let cube = sweep_cube(&positions);

    let binned = SpectralAnalysis::new(AnalysisConfig {
        binning: Binning::FullFrame,
        ..sweep_config()
    });
    let report = binned.run(&positions, &cube).unwrap();
    for result in report.succeeded() {
        assert_eq!(result.spectrum.spectra.pixels(), 1);
    }

    let cropped = SpectralAnalysis::new(AnalysisConfig {
        roi: Some(crate::ftir_pipeline::common::cube::Roi::new(0, 1, 1, 2)),
        ..sweep_config()
    });
    let prepared = cropped.prepare_cube(&cube).unwrap();
    assert_eq!((prepared.rows(), prepared.cols()), (1, 1));
    assert_eq!(prepared.get(0, 0, 0), cube.get(0, 0, 1));
}

#[test]
fn test_analysis_rejects_mismatched_positions() {
    let positions = sweep_positions();
    let cube = sweep_cube(&positions[..5]);
    let result = SpectralAnalysis::new(sweep_config()).run(&positions, &cube);
    assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
}
