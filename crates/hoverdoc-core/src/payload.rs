//! Tooltip payload builder.
//!
//! Matches one block's tokens and diagnostics against the knowledge base and
//! merges every finding for the same token text into one [`TooltipPayload`].
//!
//! Diagnostics are applied before knowledge-base matches, so a token that is
//! both known and erroneous keeps its error entries. Messages live in sets:
//! an identifier that appears ten times in a block still gets one info entry.
//!
//! ```rust
//! use hoverdoc_core::knowledge::{KnowledgeBase, TypeDefinitionEntry};
//! use hoverdoc_core::payload::build;
//! use hoverdoc_core::tokenize::Tokenizer;
//!
//! let kb = KnowledgeBase::from_entries([(
//!     "Foo".to_string(),
//!     TypeDefinitionEntry::new("interface", "Example"),
//! )]);
//! let output = Tokenizer::new().tokenize("const x: Foo = bar();", "ts");
//! let payloads = build(&output.tokens, &output.diagnostics, &kb);
//!
//! assert_eq!(payloads.len(), 1);
//! assert!(payloads["Foo"].encode().starts_with("info:::interface\ntype:"));
//! ```

use crate::knowledge::KnowledgeBase;
use crate::tokenize::{Diagnostic, Token};
use crate::wire::{self, Message, TypeInfo};
use std::collections::{BTreeMap, BTreeSet};

/// Payloads for one block, keyed by distinct token text.
pub type PayloadMap = BTreeMap<String, TooltipPayload>;

/// All messages attached to one distinct token text within one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipPayload {
    errors: BTreeSet<Message>,
    infos: BTreeSet<Message>,
}

impl TooltipPayload {
    /// Add an error message.
    pub fn add_error(&mut self, message: &str) {
        self.errors.insert(Message::Error(message.to_string()));
    }

    /// Add a warning; warnings travel with the errors set but do not mark the
    /// trigger as erroneous.
    pub fn add_warning(&mut self, message: &str) {
        self.errors.insert(Message::Warning(message.to_string()));
    }

    /// Add an informational message.
    pub fn add_info(&mut self, message: Message) {
        self.infos.insert(message);
    }

    /// Whether any error-kind message is present.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|m| matches!(m, Message::Error(_)))
    }

    /// Whether the payload carries nothing.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.infos.is_empty()
    }

    /// Error and warning messages.
    pub fn errors(&self) -> &BTreeSet<Message> {
        &self.errors
    }

    /// Info messages.
    pub fn infos(&self) -> &BTreeSet<Message> {
        &self.infos
    }

    /// All messages, errors first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.errors.iter().chain(self.infos.iter())
    }

    /// Wire encoding for the `data-tooltip` attribute.
    pub fn encode(&self) -> String {
        wire::encode(self.messages())
    }
}

/// Build the payload map for one block.
pub fn build(tokens: &[Token], diagnostics: &[Diagnostic], kb: &KnowledgeBase) -> PayloadMap {
    let mut payloads = PayloadMap::new();

    for diagnostic in diagnostics {
        if diagnostic.text.trim().is_empty() {
            tracing::debug!("Diagnostic without a span: {}", diagnostic.message);
            continue;
        }
        payloads
            .entry(diagnostic.text.clone())
            .or_default()
            .add_error(&diagnostic.message);
    }

    for token in tokens {
        let Some(entry) = kb.get(&token.text) else {
            continue;
        };
        let info = TypeInfo {
            kind: entry.kind.clone(),
            color: entry.color(),
            description: entry.description.clone(),
        };
        payloads
            .entry(token.text.clone())
            .or_default()
            .add_info(Message::type_info(info));
    }

    payloads.retain(|_, payload| !payload.is_empty());
    payloads
}
