use std::path::PathBuf;

use thiserror::Error;

/// Domain failures raised by the extraction pipeline.
///
/// I/O and decoder errors are not wrapped here; they travel as `anyhow::Error`
/// with context naming the path involved.
#[derive(Debug, Error)]
pub enum GifsplitError {
    #[error("invalid input pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unsupported animated image format for {}: {detail}", path.display())]
    UnsupportedFormat { path: PathBuf, detail: String },

    #[error("cannot derive an output directory name from {}", path.display())]
    MissingStem { path: PathBuf },

    #[error("unknown output image extension {0:?}")]
    UnknownOutputExtension(String),

    #[error("output format {ext:?} cannot store RGBA frames: {detail}")]
    UnsupportedOutputFormat { ext: String, detail: String },
}
