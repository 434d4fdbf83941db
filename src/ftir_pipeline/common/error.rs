use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Malformed sequence data: {0}")]
    FormatError(String),

    #[error("Unrecognised recording file name: {0}")]
    InvalidFileName(String),

    #[error("Position interpolation failed: {0}")]
    InterpolationError(String),

    #[error("Wavelength window selects no frequency bins: {0}")]
    RangeError(String),

    #[error("Fourier transform failed: {0}")]
    TransformError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to encode archive: {0}")]
    EncodeError(String),

    #[error("Failed to decode archive: {0}")]
    DecodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
