//! Error types and handling for hoverdoc-core operations.
//!
//! The annotation pipeline itself recovers from almost everything locally: a
//! parser that fails yields no tokens, a payload that cannot be encoded falls
//! back to a minimal one, a token the annotator cannot place is skipped. The
//! [`Error`] type therefore mostly surfaces at the edges of the crate, where
//! files are read and configuration or knowledge bases are loaded.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading pages, knowledge base files, config files
//! - **Parse Errors**: markdown documents that tree-sitter cannot parse
//! - **Tokenize Errors**: source-language parser setup failures
//! - **Highlight Errors**: highlighter rules that fail to compile
//! - **Configuration Errors**: invalid `hoverdoc.toml` values
//! - **Serialization Errors**: JSON/TOML encoding and decoding
//!
//! ```rust
//! use hoverdoc_core::{Error, Result};
//!
//! fn load() -> Result<()> {
//!     Err(Error::NotFound("knowledge base".into()))
//! }
//!
//! match load() {
//!     Err(e) if e.is_recoverable() => println!("retrying: {e}"),
//!     Err(e) => println!("{} failure: {e}", e.category()),
//!     Ok(()) => {},
//! }
//! ```

use thiserror::Error;

/// The main error type for hoverdoc-core operations.
///
/// `Display` gives a user-facing message; the source chain is preserved for
/// wrapped I/O errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading markdown pages, knowledge base files and configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be parsed.
    ///
    /// Raised when the markdown grammar cannot be loaded or tree-sitter
    /// returns no tree for a page.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A source-language parser could not be prepared.
    ///
    /// Failures while tokenizing a block never surface here; they become
    /// diagnostics. This variant is for setup problems such as a grammar
    /// version mismatch.
    #[error("Tokenize error: {0}")]
    Tokenize(String),

    /// The highlighter could not be built.
    #[error("Highlight error: {0}")]
    Highlight(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// ## Common Causes
    ///
    /// - Invalid TOML syntax in `hoverdoc.toml`
    /// - An empty fence marker
    /// - Unreadable knowledge base path
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Highlight(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away when the operation is retried.
    ///
    /// Only interrupted or timed-out I/O qualifies; everything else is a
    /// property of the input.
    ///
    /// ```rust
    /// use hoverdoc_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "eintr")).is_recoverable());
    /// assert!(!Error::Config("empty marker".into()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier, for logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Tokenize(_) => "tokenize",
            Self::Highlight(_) => "highlight",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        // Given: Different error variants
        let cases = vec![
            (Error::Parse("no tree".into()), "Parse error: no tree"),
            (Error::Tokenize("abi".into()), "Tokenize error: abi"),
            (Error::Config("bad".into()), "Configuration error: bad"),
            (Error::NotFound("kb.json".into()), "Not found: kb.json"),
        ];

        // Then: Display carries the prefix and message
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_serde_json_conversion() {
        // Given: A malformed JSON document
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        // When: Converting into our error type
        let error: Error = err.into();

        // Then: It lands in the serialization category
        assert_eq!(error.category(), "serialization");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let error: Error = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();

        let source = std::error::Error::source(&error);

        assert!(source.is_some());
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_interrupted_io_is_recoverable() {
        let error: Error = io::Error::new(io::ErrorKind::Interrupted, "eintr").into();
        assert!(error.is_recoverable());
        assert_eq!(error.category(), "io");
    }

    proptest! {
        #[test]
        fn test_config_error_with_arbitrary_messages(msg in r".{0,200}") {
            let error = Error::Config(msg.clone());
            prop_assert!(error.to_string().contains(&msg));
            prop_assert_eq!(error.category(), "config");
            prop_assert!(!error.is_recoverable());
        }
    }
}
