mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gifsplit_core::pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = cli::Cli::parse().into_config();

    let summary = pipeline::run(&config).context("frame extraction failed")?;

    info!(
        inputs = summary.inputs(),
        processed = summary.processed,
        skipped = summary.skipped,
        frames_written = summary.frames_written,
        "done"
    );
    Ok(())
}
