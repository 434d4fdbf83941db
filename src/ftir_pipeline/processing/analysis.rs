//! Scan-by-scan spectral analysis of a processed dataset.
//!
//! Each scan runs on its own: a failure is recorded against that scan and
//! the remaining scans carry on. Pixels within a scan are spread across the
//! rayon pool by the resampling and transform stages.

use tracing::{info, info_span, instrument, warn};

use crate::ftir_pipeline::common::cube::FrameCube;
use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::common::timing::PipelineTimings;
use crate::ftir_pipeline::config::{AnalysisConfig, Binning};
use crate::ftir_pipeline::interferogram::{modulation_summary, resample_scan};
use crate::ftir_pipeline::position::{Scan, segment_scans};
use crate::ftir_pipeline::processing::types::{
    AnalysisReport, ProcessedDataset, ScanOutcome, ScanResult,
};
use crate::ftir_pipeline::spectrum::{restrict_scan, snr_scan, transform_scan};

pub struct SpectralAnalysis {
    config: AnalysisConfig,
}

impl SpectralAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Crops to the region of interest, then bins.
    pub fn prepare_cube(&self, cube: &FrameCube) -> Result<FrameCube> {
        let cropped = match self.config.roi {
            Some(roi) => cube.subset(roi)?,
            None => cube.clone(),
        };
        match self.config.binning {
            Binning::None => Ok(cropped),
            Binning::Blocks { y, x } => cropped.bin(y, x),
            Binning::FullFrame => cropped.bin_full_frame(),
        }
    }

    pub fn analyze_dataset(&self, dataset: &ProcessedDataset) -> Result<AnalysisReport> {
        self.run(&dataset.positions(), &dataset.cube)
    }

    /// Segments `positions` into scans and analyses each one.
    ///
    /// Only errors in the shared preparation fail the call. Per-scan errors
    /// land in the matching [`ScanOutcome`].
    #[instrument(skip_all, fields(frames = positions.len()))]
    pub fn run(&self, positions: &[f64], cube: &FrameCube) -> Result<AnalysisReport> {
        if positions.len() != cube.frames() {
            return Err(PipelineError::InvalidParameter(format!(
                "{} positions for {} frames",
                positions.len(),
                cube.frames()
            )));
        }

        let mut timings = PipelineTimings::new();
        let cube = timings.time("prepare", || self.prepare_cube(cube))?;
        let scans = timings.time("segment", || segment_scans(positions, self.config.half_path_length));

        let mut outcomes = Vec::with_capacity(scans.len());
        for (index, scan) in scans.into_iter().enumerate() {
            let _span = info_span!("scan", index, start = scan.start, end = scan.end).entered();
            let result = self.analyze_scan(scan, &positions[scan.frames()], &cube, &mut timings);
            if let Err(e) = &result {
                warn!("Scan {} failed: {}", index, e);
            }
            outcomes.push(ScanOutcome { scan, result });
        }

        let report = AnalysisReport { outcomes, timings };
        info!(
            "Analysed {} scans, {} failed",
            report.outcomes.len(),
            report.failed()
        );
        report.timings.log_summary();
        Ok(report)
    }

    fn analyze_scan(
        &self,
        scan: Scan,
        positions: &[f64],
        cube: &FrameCube,
        timings: &mut PipelineTimings,
    ) -> Result<ScanResult> {
        let frames = cube.slice_frames(scan.start, scan.end + 1)?;

        let modulation = modulation_summary(&frames.to_pixel_series()?);
        info!(
            max = modulation.max,
            min = modulation.min,
            mean = modulation.mean,
            ratio = modulation.ratio,
            "Modulation"
        );

        let params = self.config.resample_params();
        let resampled = timings.time("resample", || resample_scan(positions, &frames, &params))?;
        let spectrum = timings.time("transform", || transform_scan(&resampled, self.config.spacing_cm()))?;

        let band = match &self.config.window {
            Some(window) => Some(timings.time("filter", || restrict_scan(&spectrum, window))?),
            None => None,
        };
        let snr = match self.config.snr_window {
            Some(window) => {
                let source = band.as_ref().unwrap_or(&spectrum);
                Some(timings.time("snr", || snr_scan(source, window))?)
            }
            None => None,
        };

        Ok(ScanResult {
            scan,
            modulation,
            resampled,
            spectrum,
            band,
            snr,
        })
    }
}
