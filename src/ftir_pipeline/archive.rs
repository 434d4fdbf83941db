//! Persistence module
//!
//! Processed datasets are stored as a multi-page 64-bit float TIFF holding
//! the frame cube and a JSON sidecar holding everything else.

mod cube_codec;
mod tiff_stack;
pub mod types;
pub mod sidecar;
pub mod dataset;

pub use cube_codec::{CubeReader, CubeWriter};
pub use tiff_stack::TiffStackCodec;
pub use types::{ArchiveNames, TiffCompression};
pub use sidecar::{read_sidecar, write_sidecar};
pub use dataset::DatasetArchive;
