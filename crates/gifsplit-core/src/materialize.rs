use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::{debug, info};

use crate::config::ExtractConfig;
use crate::error::GifsplitError;

/// What happened to one input's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The output directory was created and this many frames were written into it.
    Written { frames: u32 },
    /// The output directory already existed; nothing was decoded or written.
    Skipped,
}

fn stem_of(input: &Path) -> Result<&str> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GifsplitError::MissingStem {
            path: input.to_path_buf(),
        })?;
    Ok(stem)
}

/// Output directory for `input`: `<output base>/<input stem>`.
pub fn output_dir_for(config: &ExtractConfig, input: &Path) -> Result<PathBuf> {
    Ok(config.output_base().join(stem_of(input)?))
}

/// Path of the `index`th (1-based) frame inside `dir`.
pub fn frame_path(dir: &Path, index: u32, ext: &str) -> PathBuf {
    dir.join(format!("{index}.{ext}"))
}

/// Write every frame of `frames` into the output directory for `input`.
///
/// An existing output directory marks the input as already processed: the
/// frames are left unconsumed and nothing is written. A failed write stops
/// immediately and leaves the frames written so far in place.
pub fn write_frames<I>(frames: I, input: &Path, config: &ExtractConfig) -> Result<Outcome>
where
    I: IntoIterator<Item = Result<RgbaImage>>,
{
    let format = config.output_format()?;
    let dir = output_dir_for(config, input)?;
    debug!(?dir, "output directory");

    if dir.exists() {
        debug!(?dir, ?input, "output directory already exists, skipping");
        return Ok(Outcome::Skipped);
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    info!(stem = stem_of(input)?, "destination directory is created");

    let mut written = 0;
    for frame in frames {
        let image = frame?;
        let index = written + 1;
        let path = frame_path(&dir, index, &config.output_ext);
        image
            .save_with_format(&path, format)
            .with_context(|| format!("failed to save frame to {}", path.display()))?;
        written = index;

        info!(path = %path.display(), "frame is saved");
    }

    Ok(Outcome::Written { frames: written })
}
