//! Tokens command implementation

use anyhow::Result;
use colored::Colorize;
use hoverdoc_core::{Config, TokenizeOutput};
use std::path::Path;

use crate::output::OutputFormat;
use crate::utils::read_input;

/// Tokenize a source file and print what the adapter produced.
pub fn execute(config: &Config, file: &Path, lang: &str, format: OutputFormat) -> Result<()> {
    let source = read_input(file)?;
    let tokenizer = config.tokenizer();
    if !tokenizer.supports(lang) {
        tracing::info!("No dedicated parser for '{lang}', using the lexical scanner");
    }
    let output = tokenizer.tokenize(&source, lang);

    match format {
        OutputFormat::Text => print_text(&output),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

fn print_text(output: &TokenizeOutput) {
    for token in &output.tokens {
        let range = format!("{}..{}", token.range.start, token.range.end);
        println!(
            "{:>10}  {:<18} {}",
            range.bright_black(),
            token.kind.as_deref().unwrap_or("-"),
            token.text
        );
    }

    for diagnostic in &output.diagnostics {
        let at = diagnostic
            .range
            .map(|range| format!(" at {}..{}", range.start, range.end))
            .unwrap_or_default();
        println!(
            "{}{at}: {} ({})",
            "error".red().bold(),
            diagnostic.message,
            diagnostic.text
        );
    }

    println!(
        "{} tokens, {} diagnostics",
        output.tokens.len(),
        output.diagnostics.len()
    );
}
