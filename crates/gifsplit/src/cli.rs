use std::path::PathBuf;

use clap::Parser;

use gifsplit_core::config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_EXT, DEFAULT_PATTERN};
use gifsplit_core::ExtractConfig;

/// Split animated images into numbered still frames, then delete the originals.
#[derive(Parser, Debug)]
#[command(name = "gifsplit", version)]
pub struct Cli {
    /// Directory scanned for animated images.
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Glob pattern selecting input files inside the input directory.
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Extension (and format) of the written frame files.
    #[arg(short = 'e', long, default_value = DEFAULT_OUTPUT_EXT)]
    pub output_ext: String,

    /// Base directory for per-input frame directories (defaults to the input directory).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> ExtractConfig {
        ExtractConfig {
            input_dir: self.input_dir,
            pattern: self.pattern,
            output_ext: self.output_ext,
            output_dir: self.output_dir,
        }
    }
}
