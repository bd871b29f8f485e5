//! Shared helpers for command implementations.

pub mod logging;

use anyhow::{Context, Result};
use hoverdoc_core::Config;
use std::io::Read;
use std::path::Path;

use crate::cli::Cli;

/// Resolve configuration from `--config` (or discovery), then apply `--kb`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(kb) = &cli.kb {
        config.knowledge_base.path = Some(kb.clone());
    }
    Ok(config)
}

/// Read a whole input file; `-` reads stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write `content` to `path`, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!("Wrote {}", path.display());
        },
        None => print!("{content}"),
    }
    Ok(())
}
