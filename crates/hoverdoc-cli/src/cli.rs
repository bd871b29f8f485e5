//! # CLI Structure and Argument Parsing
//!
//! Command-line interface for `hoverdoc`, the build step that turns opted-in
//! markdown code fences into annotated, hoverable HTML blocks.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Annotate every `hover` fence in a page
//! hoverdoc annotate docs/guide.md -o build/guide.md
//!
//! # Render a single source file as a block
//! hoverdoc render snippet.ts --lang ts
//!
//! # Inspect what the tokenizer sees
//! hoverdoc tokens snippet.rs --lang rust --format json
//!
//! # Browse the knowledge base
//! hoverdoc kb search prom
//! ```
//!
//! Global options (`--config`, `--kb`, `-v`, `-q`, `--no-color`) apply to
//! every command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `hoverdoc` command
#[derive(Parser, Clone, Debug)]
#[command(name = "hoverdoc")]
#[command(version)]
#[command(about = "Annotate documentation code blocks with hover tooltips", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./hoverdoc.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Knowledge base file (JSON or TOML), overriding the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub kb: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Annotate the opted-in code fences of a markdown page
    Annotate {
        /// Markdown file, or `-` for stdin
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Render one source file as a code block
    Render {
        /// Source file, or `-` for stdin
        file: PathBuf,

        /// Language tag of the source
        #[arg(short = 'l', long)]
        lang: String,

        /// Highlight only, without tooltips
        #[arg(long)]
        no_annotate: bool,
    },

    /// Show the tokens and diagnostics extracted from a source file
    Tokens {
        /// Source file, or `-` for stdin
        file: PathBuf,

        /// Language tag of the source
        #[arg(short = 'l', long)]
        lang: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Inspect the knowledge base
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum KbCommand {
    /// List every entry
    List {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one entry
    Show {
        /// Identifier to look up (exact match)
        name: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Fuzzy search names and descriptions
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl Cli {
    /// Output format selected by the command, if it has one.
    pub const fn format(&self) -> Option<OutputFormat> {
        match &self.command {
            Commands::Tokens { format, .. }
            | Commands::Kb {
                command:
                    KbCommand::List { format }
                    | KbCommand::Show { format, .. }
                    | KbCommand::Search { format, .. },
            } => Some(*format),
            Commands::Annotate { .. } | Commands::Render { .. } => None,
        }
    }
}
