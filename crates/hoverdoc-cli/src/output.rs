//! Output format selection.

/// How a command prints its result.
///
/// ```bash
/// hoverdoc kb list --format json | jq 'keys'
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Whether the output is meant for another program.
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Json)
    }
}
