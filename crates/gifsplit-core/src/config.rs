use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::GifsplitError;

pub const DEFAULT_INPUT_DIR: &str = "assets/images";
pub const DEFAULT_PATTERN: &str = "*.gif";
pub const DEFAULT_OUTPUT_EXT: &str = "png";

/// Parameters for a frame extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Directory scanned for animated images.
    pub input_dir: PathBuf,
    /// Glob pattern matched against file names inside `input_dir`.
    pub pattern: String,
    /// Extension of the written frame files, also selects the encoder.
    pub output_ext: String,
    /// Base directory for per-input output directories, or None to use `input_dir`.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            pattern: DEFAULT_PATTERN.to_string(),
            output_ext: DEFAULT_OUTPUT_EXT.to_string(),
            output_dir: None,
        }
    }
}

impl ExtractConfig {
    /// Build a config rooted at `dir` for both input and output, other options default.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Directory under which `<stem>/` output directories are created.
    pub fn output_base(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.input_dir)
    }

    /// Image format the frames are written in.
    ///
    /// Decoded frames are RGBA8, so the format must be able to encode RGBA8;
    /// a 1x1 image is encoded in memory to check.
    pub fn output_format(&self) -> Result<ImageFormat> {
        let format = ImageFormat::from_extension(&self.output_ext)
            .ok_or_else(|| GifsplitError::UnknownOutputExtension(self.output_ext.clone()))?;

        RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]))
            .write_to(&mut Cursor::new(Vec::new()), format)
            .map_err(|e| GifsplitError::UnsupportedOutputFormat {
                ext: self.output_ext.clone(),
                detail: e.to_string(),
            })?;
        Ok(format)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(GifsplitError::InvalidPattern {
                pattern: self.pattern.clone(),
                reason: "pattern is empty".to_string(),
            }
            .into());
        }
        self.output_format()?;
        Ok(())
    }
}
