//! Archive configuration types

use serde::{Deserialize, Serialize};

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

impl TiffCompression {
    pub(crate) fn encoder_method(self) -> tiff::encoder::Compression {
        use tiff::encoder::Compression;
        use tiff::encoder::compression::DeflateLevel;

        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        }
    }
}

/// File names of one processed dataset inside its output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveNames {
    pub cube: String,
    pub sidecar: String,
}

impl ArchiveNames {
    pub fn for_dataset(name: &str) -> Self {
        Self {
            cube: format!("{}_processed_data.tiff", name),
            sidecar: format!("{}_processed_meta_logs.json", name),
        }
    }
}
