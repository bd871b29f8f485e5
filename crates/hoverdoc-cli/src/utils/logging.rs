//! Logging initialization and configuration.
//!
//! Sets up the tracing subscriber and color control based on CLI flags and
//! environment variables.

use anyhow::Result;
use colored::control as color_control;
use is_terminal::IsTerminal;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;

/// Initialize the logging subsystem based on CLI flags.
///
/// Logs go to stderr so stdout only carries command output. Machine-readable
/// output drops the level to errors unless `--verbose` was given.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let machine_output = cli.format().is_some_and(|format| format.is_machine());

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet || machine_output {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color || env_no_color || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}
