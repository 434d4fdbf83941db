//! Reader for the modulator controller's binary position logs.
//!
//! A log directory holds `modulator_*` files written in sequence. Each row is
//! eleven big-endian `f64` values. The first file opens with an eight-value
//! info row, and the last file is padded with filler rows whose step is
//! `-9999`.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::ftir_pipeline::common::error::{PipelineError, Result};
use crate::ftir_pipeline::position::types::{ModulatorInfo, ModulatorLogRow, PositionLog};

const LOG_PREFIX: &str = "modulator_";
const INFO_FIELDS: usize = 8;
const FILLER_STEP: f64 = -9999.0;

/// Control loop rate the `step` column counts at.
pub const DEFAULT_PROGRAM_RATE_HZ: f64 = 2000.0;

pub trait PositionSource {
    fn read_positions(&self, log_dir: &Path) -> Result<PositionLog>;
}

/// Parsed contents of a modulator log directory.
#[derive(Debug, Clone, Default)]
pub struct ModulatorLog {
    pub info: Option<ModulatorInfo>,
    pub rows: Vec<ModulatorLogRow>,
}

impl ModulatorLog {
    /// UTC time of each row assuming a steady control loop, anchored on the
    /// first row.
    pub fn interpolated_utc(&self, program_rate: f64) -> Vec<f64> {
        let Some(first) = self.rows.first() else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|r| first.utc_time + (r.step - first.step) / program_rate)
            .collect()
    }

    pub fn position_log(&self, program_rate: f64) -> PositionLog {
        PositionLog {
            counters: self.rows.iter().map(ModulatorLogRow::counter).collect(),
            positions: self.rows.iter().map(ModulatorLogRow::stage_position).collect(),
            utc_times: self.interpolated_utc(program_rate),
        }
    }
}

pub struct ModulatorLogReader {
    program_rate: f64,
}

impl Default for ModulatorLogReader {
    fn default() -> Self {
        Self {
            program_rate: DEFAULT_PROGRAM_RATE_HZ,
        }
    }
}

impl ModulatorLogReader {
    pub fn new(program_rate: f64) -> Self {
        Self { program_rate }
    }

    /// Parses one log file. `first` strips the info row, `last` drops filler rows.
    pub fn parse_file(&self, data: &[u8], first: bool, last: bool) -> Result<ModulatorLog> {
        let mut body = data;
        let mut info = None;

        if first {
            let info_bytes = INFO_FIELDS * 8;
            if data.len() < info_bytes {
                return Err(PipelineError::FormatError(format!(
                    "log of {} bytes has no info row",
                    data.len()
                )));
            }
            let v = read_be_f64s::<INFO_FIELDS>(&data[..info_bytes]);
            info = Some(ModulatorInfo {
                open_loop: v[0],
                max_position: v[1],
                sweep_length: v[2],
                offset: v[3],
                kp: v[4],
                ki: v[5],
                kd: v[6],
                tau: v[7],
            });
            body = &data[info_bytes..];
        }

        let row_bytes = ModulatorLogRow::FIELDS * 8;
        let chunks = body.chunks_exact(row_bytes);
        if !chunks.remainder().is_empty() {
            debug!("Ignoring {} trailing bytes of a partial log row", chunks.remainder().len());
        }

        let mut rows: Vec<ModulatorLogRow> = chunks
            .map(|chunk| ModulatorLogRow::from_fields(&read_be_f64s::<{ ModulatorLogRow::FIELDS }>(chunk)))
            .collect();

        if last {
            let before = rows.len();
            rows.retain(|r| r.step != FILLER_STEP);
            debug!("Cut {} filler rows", before - rows.len());
        }

        Ok(ModulatorLog { info, rows })
    }

    /// Reads and concatenates every `modulator_*` file in `log_dir`, in name order.
    pub fn read_dir(&self, log_dir: &Path) -> Result<ModulatorLog> {
        let mut files = Vec::new();
        let entries = std::fs::read_dir(log_dir)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", log_dir.display(), e)))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(LOG_PREFIX) {
                files.push(name);
            } else {
                warn!("Skipped spurious file named {}", name);
            }
        }
        files.sort();

        let mut log = ModulatorLog::default();
        let count = files.len();
        for (idx, name) in files.iter().enumerate() {
            let path = log_dir.join(name);
            let data = std::fs::read(&path)
                .map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))?;
            let part = self.parse_file(&data, idx == 0, idx + 1 == count)?;

            if let (Some(first), Some(last)) = (part.rows.first(), part.rows.last()) {
                info!("{}: steps {} to {}", name, first.step as i64, last.step as i64);
            }
            if part.info.is_some() {
                log.info = part.info;
            }
            log.rows.extend(part.rows);
        }

        if log.rows.is_empty() {
            return Err(PipelineError::InputReadError(format!(
                "no modulator log rows under {}",
                log_dir.display()
            )));
        }
        Ok(log)
    }
}

impl PositionSource for ModulatorLogReader {
    fn read_positions(&self, log_dir: &Path) -> Result<PositionLog> {
        Ok(self.read_dir(log_dir)?.position_log(self.program_rate))
    }
}

fn read_be_f64s<const N: usize>(bytes: &[u8]) -> [f64; N] {
    let mut out = [0.0; N];
    for (o, chunk) in out.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut b = [0u8; 8];
        b.copy_from_slice(chunk);
        *o = f64::from_be_bytes(b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_bytes(step: f64, position: f64, counter: f64) -> Vec<u8> {
        let fields = [
            10.0 + step, 1_741_100_000.0, step, 0.0, 0.0, position, 0.0, 0.0, counter, 0.0, 0.0,
        ];
        fields.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn info_bytes() -> Vec<u8> {
        [0.0, 25.0, 12.5, 0.0, 1.0, 0.1, 0.01, 0.5]
            .iter()
            .flat_map(|v: &f64| v.to_be_bytes())
            .collect()
    }

    #[test]
    fn test_first_file_carries_info_row() {
        let mut data = info_bytes();
        data.extend(row_bytes(0.0, 1.5, 0.0));
        data.extend(row_bytes(1.0, 1.6, 0.0));

        let log = ModulatorLogReader::default().parse_file(&data, true, false).unwrap();
        let info = log.info.unwrap();
        assert_eq!(info.max_position, 25.0);
        assert_eq!(info.sweep_length, 12.5);
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.rows[1].stage_position(), 1.6);
    }

    #[test]
    fn test_last_file_drops_filler_and_partial_rows() {
        let mut data = row_bytes(5.0, 2.0, 3.0);
        data.extend(row_bytes(FILLER_STEP, 0.0, 0.0));
        data.extend([0u8; 17]);

        let log = ModulatorLogReader::default().parse_file(&data, false, true).unwrap();
        assert!(log.info.is_none());
        assert_eq!(log.rows.len(), 1);
        assert_eq!(log.rows[0].counter(), 3.0);
    }

    #[test]
    fn test_interpolated_utc_follows_step() {
        let mut data = row_bytes(100.0, 0.0, 0.0);
        data.extend(row_bytes(102.0, 0.0, 1.0));
        let log = ModulatorLogReader::default().parse_file(&data, false, false).unwrap();
        let positions = log.position_log(DEFAULT_PROGRAM_RATE_HZ);
        assert_eq!(positions.utc_times[0], 1_741_100_000.0);
        assert_eq!(positions.utc_times[1], 1_741_100_000.0 + 0.001);
        assert_eq!(positions.counters, vec![0.0, 1.0]);
    }

    #[test]
    fn test_read_dir_concatenates_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = info_bytes();
        first.extend(row_bytes(0.0, 1.0, 0.0));
        let mut second = row_bytes(1.0, 2.0, 1.0);
        second.extend(row_bytes(FILLER_STEP, 0.0, 0.0));

        std::fs::write(dir.path().join("modulator_002.bin"), &second).unwrap();
        std::fs::write(dir.path().join("modulator_001.bin"), &first).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"ignore me").unwrap();

        let positions = ModulatorLogReader::default().read_positions(dir.path()).unwrap();
        assert_eq!(positions.positions, vec![1.0, 2.0]);
        assert_eq!(positions.counters, vec![0.0, 1.0]);
    }

    #[test]
    fn test_empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModulatorLogReader::default().read_positions(dir.path());
        assert!(matches!(result, Err(PipelineError::InputReadError(_))));
    }
}
