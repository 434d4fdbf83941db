//! Stage position module
//!
//! Reading the modulator position log, assigning a stage position to every
//! camera subframe and cutting the positioned series into scans.

mod log_reader;
pub mod types;
pub mod interpolate;
pub mod scans;

pub use log_reader::{
    DEFAULT_PROGRAM_RATE_HZ, ModulatorLog, ModulatorLogReader, PositionSource,
};
pub use types::{ModulatorInfo, ModulatorLogRow, PositionLog, Scan};
pub use interpolate::interpolate_positions;
pub use scans::segment_scans;
