//! Tokenizer adapter: source text in, tokens and diagnostics out.
//!
//! [`Tokenizer`] owns a registry from language tag to a [`SourceParser`].
//! Whatever the parser does, [`Tokenizer::tokenize`] returns normally: a
//! parser that panics is contained at this boundary and reported as a
//! diagnostic with empty text, which the payload builder never attaches to
//! any token.
//!
//! Token ranges are character offsets (not bytes) into the block source
//! exactly as it was handed in.
//!
//! ```rust
//! use hoverdoc_core::tokenize::Tokenizer;
//!
//! let tokenizer = Tokenizer::new();
//! let output = tokenizer.tokenize("const x: Foo = bar();", "ts");
//! assert!(output.tokens.iter().any(|t| t.text == "Foo"));
//! assert!(output.diagnostics.is_empty());
//! ```

mod lexical;
mod treesitter;

pub use lexical::LexicalParser;
pub use treesitter::TreeSitterParser;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Half-open character range `[start, end)` into a block's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    /// First character offset.
    pub start: usize,
    /// One past the last character offset.
    pub end: usize,
}

impl CharRange {
    /// Create a range.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token text as it appears in the source.
    pub text: String,
    /// Position in the source.
    pub range: CharRange,
    /// Parser-specific kind label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A span the parser could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source text the diagnostic is attached to; empty when it has no span.
    pub text: String,
    /// Human-readable message.
    pub message: String,
    /// Position in the source, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<CharRange>,
}

/// Result of tokenizing one block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizeOutput {
    /// Tokens in source order.
    pub tokens: Vec<Token>,
    /// Parser diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// A source-language parser the adapter can wrap.
///
/// Implementations should report problems as diagnostics rather than panic,
/// but the adapter does not rely on it.
pub trait SourceParser: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Tokenize `source`.
    fn parse(&self, source: &str) -> TokenizeOutput;
}

/// Language-aware tokenizer adapter.
#[derive(Clone)]
pub struct Tokenizer {
    parsers: HashMap<String, Arc<dyn SourceParser>>,
    fallback: Arc<dyn SourceParser>,
}

impl Tokenizer {
    /// Registry with the built-in parsers.
    ///
    /// Rust goes through tree-sitter; the C-family web languages and any
    /// unknown tag go through the lexical scanner.
    pub fn new() -> Self {
        let lexical: Arc<dyn SourceParser> = Arc::new(LexicalParser::new());
        let mut tokenizer = Self {
            parsers: HashMap::new(),
            fallback: Arc::clone(&lexical),
        };

        for tag in ["ts", "typescript", "tsx", "js", "javascript", "jsx", "vue", "mjs", "cjs"] {
            tokenizer.register(tag, Arc::clone(&lexical));
        }

        match TreeSitterParser::try_new("tree-sitter-rust", tree_sitter_rust::LANGUAGE.into()) {
            Ok(parser) => {
                let rust: Arc<dyn SourceParser> = Arc::new(parser);
                tokenizer.register("rust", Arc::clone(&rust));
                tokenizer.register("rs", rust);
            },
            Err(e) => tracing::warn!("Rust blocks fall back to the lexical scanner: {e}"),
        }

        tokenizer
    }

    /// Register (or replace) the parser for a language tag.
    pub fn register(&mut self, language: &str, parser: Arc<dyn SourceParser>) {
        self.parsers.insert(language.to_ascii_lowercase(), parser);
    }

    /// Make `alias` resolve to whatever `target` resolves to.
    ///
    /// Returns `false` when `target` has no registered parser.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        match self.parsers.get(&target.to_ascii_lowercase()).cloned() {
            Some(parser) => {
                self.register(alias, parser);
                true
            },
            None => false,
        }
    }

    /// Whether a dedicated parser is registered for `language`.
    pub fn supports(&self, language: &str) -> bool {
        self.parsers.contains_key(&language.to_ascii_lowercase())
    }

    fn parser_for(&self, language: &str) -> &Arc<dyn SourceParser> {
        self.parsers
            .get(&language.to_ascii_lowercase())
            .unwrap_or(&self.fallback)
    }

    /// Tokenize `source` as `language`. Never panics.
    pub fn tokenize(&self, source: &str, language: &str) -> TokenizeOutput {
        let parser = self.parser_for(language);
        match catch_unwind(AssertUnwindSafe(|| parser.parse(source))) {
            Ok(output) => {
                tracing::debug!(
                    "{} parser produced {} tokens, {} diagnostics",
                    parser.name(),
                    output.tokens.len(),
                    output.diagnostics.len()
                );
                output
            },
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::warn!(
                    "{} parser failed on a {language} block, rendering without tooltips: {reason}",
                    parser.name()
                );
                TokenizeOutput {
                    tokens: Vec::new(),
                    diagnostics: vec![Diagnostic {
                        text: String::new(),
                        message: format!("Parser failure: {reason}"),
                        range: None,
                    }],
                }
            },
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.parsers.keys().collect();
        languages.sort();
        f.debug_struct("Tokenizer")
            .field("languages", &languages)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Maps byte offsets of one source string to character offsets.
pub(crate) struct CharOffsets {
    byte_starts: Vec<usize>,
    len_bytes: usize,
}

impl CharOffsets {
    pub(crate) fn new(source: &str) -> Self {
        Self {
            byte_starts: source.char_indices().map(|(i, _)| i).collect(),
            len_bytes: source.len(),
        }
    }

    /// Character offset of a byte offset; offsets inside a character round down.
    pub(crate) fn char_at(&self, byte: usize) -> usize {
        if byte >= self.len_bytes {
            return self.byte_starts.len();
        }
        match self.byte_starts.binary_search(&byte) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        }
    }
}
