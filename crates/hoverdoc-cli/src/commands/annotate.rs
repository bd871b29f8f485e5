//! Annotate command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use hoverdoc_core::{CodeBlockPipeline, Config, DocumentTransformer, TransformReport};
use std::path::Path;

use crate::utils::{read_input, write_output};

/// Transform a markdown page and write the result.
pub fn execute(config: &Config, file: &Path, output: Option<&Path>, quiet: bool) -> Result<()> {
    let markdown = read_input(file)?;
    let pipeline =
        CodeBlockPipeline::from_config(config).context("Failed to build the block pipeline")?;
    let mut transformer = DocumentTransformer::new(pipeline)?;

    let transformed = transformer
        .transform(&markdown)
        .with_context(|| format!("Failed to transform {}", file.display()))?;
    write_output(output, &transformed.document)?;

    if !quiet {
        eprintln!("{}", summary(&transformed.report));
    }
    Ok(())
}

fn summary(report: &TransformReport) -> String {
    let blocks = format!("{} of {}", report.annotated, report.blocks);
    let diagnostics = if report.diagnostics == 0 {
        "0 diagnostics".normal()
    } else {
        format!("{} diagnostics", report.diagnostics).yellow()
    };
    format!(
        "{} {} code blocks ({} triggers, {})",
        "Annotated".green(),
        blocks.bold(),
        report.triggers,
        diagnostics
    )
}
