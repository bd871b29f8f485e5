//! Render command implementation

use anyhow::{Context, Result};
use hoverdoc_core::{CodeBlockPipeline, Config, FenceInfo};
use std::path::Path;

use crate::utils::{read_input, write_output};

/// Render one source file as a block on stdout.
pub fn execute(config: &Config, file: &Path, lang: &str, no_annotate: bool) -> Result<()> {
    let source = read_input(file)?;
    let pipeline =
        CodeBlockPipeline::from_config(config).context("Failed to build the block pipeline")?;

    let block = if no_annotate {
        let info = FenceInfo {
            language: lang.to_string(),
            flags: Vec::new(),
        };
        pipeline.render(&source, &info)
    } else {
        pipeline.render_annotated(&source, lang)
    };

    tracing::debug!(
        "Rendered {} ({} triggers, {} diagnostics)",
        file.display(),
        block.triggers,
        block.diagnostics
    );
    write_output(None, &block.html)?;
    println!();
    Ok(())
}
