//! hoverdoc CLI - annotate documentation code blocks with hover tooltips
//!
//! This is the main entry point for the hoverdoc command-line interface.
//! Command implementations live in [`commands`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::initialize_logging(&cli)?;

    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = utils::load_config(cli)?;

    match &cli.command {
        Commands::Annotate { file, output } => {
            commands::annotate_document(&config, file, output.as_deref(), cli.quiet)
        },
        Commands::Render {
            file,
            lang,
            no_annotate,
        } => commands::render_block(&config, file, lang, *no_annotate),
        Commands::Tokens { file, lang, format } => {
            commands::show_tokens(&config, file, lang, *format)
        },
        Commands::Kb { command } => commands::inspect_knowledge_base(&config, command),
    }
}
