use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::ExtractConfig;
use crate::discovery::discover;
use crate::frames::extract_frames;
use crate::materialize::{write_frames, Outcome};

/// Totals over one run of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Inputs whose frames were written to a new output directory.
    pub processed: u32,
    /// Inputs whose output directory already existed.
    pub skipped: u32,
    /// Frames written across all processed inputs.
    pub frames_written: u32,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written { frames } => {
                self.processed += 1;
                self.frames_written += frames;
            }
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Inputs deleted during the run.
    pub fn inputs(&self) -> u32 {
        self.processed + self.skipped
    }
}

/// Run the extraction pipeline over every input matching `config`.
///
/// Inputs are handled one at a time: decode, write frames, delete the input.
/// The input is deleted even when its output directory already existed. The
/// first error stops the run; inputs not reached yet stay on disk.
pub fn run(config: &ExtractConfig) -> Result<RunSummary> {
    config.validate()?;

    info!(
        input_dir = ?config.input_dir,
        pattern = %config.pattern,
        output_ext = %config.output_ext,
        output_base = ?config.output_base(),
        "pipeline starting"
    );

    let inputs = discover(config)?;
    if inputs.is_empty() {
        warn!(input_dir = ?config.input_dir, pattern = %config.pattern, "no inputs found");
    }

    let mut summary = RunSummary::default();
    for input in &inputs {
        let outcome = process_input(input, config)?;
        summary.record(outcome);
    }

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        frames_written = summary.frames_written,
        "pipeline complete"
    );
    Ok(summary)
}

fn process_input(input: &Path, config: &ExtractConfig) -> Result<Outcome> {
    debug!(?input, "processing input");

    let mut frames = extract_frames(input)?;
    let outcome = write_frames(&mut frames, input, config)
        .with_context(|| format!("failed to write frames of {}", input.display()))?;
    debug!(
        ?input,
        format = ?frames.format(),
        decoded = frames.decoded(),
        ?outcome,
        "input processed"
    );

    std::fs::remove_file(input)
        .with_context(|| format!("failed to delete input {}", input.display()))?;
    debug!(?input, "input deleted");

    Ok(outcome)
}
