use std::path::PathBuf;

use aces_ftir_rs::ftir_pipeline::{
    AnalysisConfig, DatasetProcessor, ProcessingConfig, SpectralAnalysis, TiffCompression,
};
use aces_ftir_rs::logger;

use anyhow::{Context, Result};
use tracing::{info, warn};

fn main() -> Result<()> {
    logger::init();

    let mut args = std::env::args().skip(1);
    let dataset_dir = PathBuf::from(args.next().context("usage: aces_ftir_rs <dataset_dir> [dark_root]")?);
    let dark_root = args.next().map(PathBuf::from);

    info!("Starting aces_ftir...");

    let config = ProcessingConfig::builder()
        .compression(TiffCompression::DeflateFast)
        .dark_root(dark_root)
        .build();
    let processor = DatasetProcessor::new(config);

    let dataset = processor
        .process_dir(&dataset_dir)
        .with_context(|| format!("processing {}", dataset_dir.display()))?;
    info!("{} positioned subframes", dataset.len());

    let analysis = SpectralAnalysis::new(AnalysisConfig::default());
    let report = analysis
        .analyze_dataset(&dataset)
        .context("spectral analysis")?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) => info!(
                "Scan {}..={}: {:?} sweep, {} grid points, {} bins in band",
                outcome.scan.start,
                outcome.scan.end,
                result.resampled.direction,
                result.resampled.grid_len(),
                result.band.as_ref().map_or(0, |b| b.bins())
            ),
            Err(e) => warn!("Scan {}..={} failed: {}", outcome.scan.start, outcome.scan.end, e),
        }
    }

    Ok(())
}
