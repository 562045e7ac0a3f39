use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use tracing::{debug, info};

use crate::config::ExtractConfig;
use crate::error::GifsplitError;

/// Full glob expression for `config`: the escaped input directory joined with the pattern.
fn glob_expression(config: &ExtractConfig) -> Result<String> {
    let dir = config.input_dir.to_str().ok_or_else(|| GifsplitError::InvalidPattern {
        pattern: config.pattern.clone(),
        reason: format!(
            "input directory {} is not valid UTF-8",
            config.input_dir.display()
        ),
    })?;

    let joined = Path::new(&Pattern::escape(dir)).join(&config.pattern);
    Ok(joined.to_string_lossy().into_owned())
}

/// List the inputs matching the configured pattern, in filesystem enumeration order.
///
/// Finding nothing is not an error; a missing input directory also yields no matches.
pub fn discover(config: &ExtractConfig) -> Result<Vec<PathBuf>> {
    let expression = glob_expression(config)?;
    debug!(%expression, "scanning for inputs");

    let paths = glob::glob(&expression).map_err(|e| GifsplitError::InvalidPattern {
        pattern: config.pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut inputs = Vec::new();
    for entry in paths {
        let path = entry.context("failed to read an entry while scanning for inputs")?;
        debug!(?path, "discovered input");
        inputs.push(path);
    }

    info!(count = inputs.len(), input_dir = ?config.input_dir, "input discovery complete");
    Ok(inputs)
}
