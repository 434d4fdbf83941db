//! Interferogram reconstruction for the ACES scanning interferometer.
//!
//! Decodes ganged camera recordings, aligns them with the modulator position
//! log and turns every pixel's intensity trace into a spectrum.

pub mod ftir_pipeline;
pub mod logger;
