pub mod filter;
pub mod snr;
pub mod transformer;
pub mod types;

pub use filter::{filter_spectrum, restrict_scan, select_band};
pub use snr::{rolling_std, snr, snr_scan};
pub use transformer::{rfft_frequencies, transform_scan};
pub use types::{BandEdges, ScanSpectrum, WavelengthWindow, microns_to_wavenumber};
