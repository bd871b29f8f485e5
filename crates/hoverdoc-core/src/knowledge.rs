//! Type knowledge base: identifier text to descriptive metadata.
//!
//! The knowledge base is loaded once per build and shared read-only across
//! every code block. Entries can come from the built-in table, from a JSON or
//! TOML file, or from both (file entries override built-ins).
//!
//! ## File format
//!
//! ```toml
//! [UserService]
//! type = "class"
//! description = "Loads and caches user records"
//!
//! [UserId]
//! type = "type"
//! description = "Opaque user identifier"
//! color = { text = "#7c3aed", background = "#ede9fe" }
//! ```
//!
//! The JSON form is the same shape: an object keyed by identifier.

use crate::wire::TypeColor;
use crate::{Error, Result};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Metadata describing one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinitionEntry {
    /// Kind label shown in the tooltip (`interface`, `class`, `fn`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description.
    pub description: String,
    /// Explicit colour override; the kind palette is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TypeColor>,
}

impl TypeDefinitionEntry {
    /// Create an entry without a colour override.
    pub fn new(kind: &str, description: &str) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.to_string(),
            color: None,
        }
    }

    /// Colour used for this entry's type chip.
    pub fn color(&self) -> TypeColor {
        self.color
            .clone()
            .unwrap_or_else(|| color_for_kind(&self.kind))
    }
}

/// Palette entry for a kind label; unknown kinds get the default gray.
pub fn color_for_kind(kind: &str) -> TypeColor {
    let (text, background) = match kind.to_ascii_lowercase().as_str() {
        "interface" | "trait" => ("#2563eb", "#dbeafe"),
        "class" | "struct" => ("#059669", "#d1fae5"),
        "type" | "alias" => ("#7c3aed", "#ede9fe"),
        "enum" => ("#d97706", "#fef3c7"),
        "function" | "fn" | "method" => ("#db2777", "#fce7f3"),
        "keyword" => ("#dc2626", "#fee2e2"),
        "module" | "namespace" => ("#0891b2", "#cffafe"),
        _ => return TypeColor::default_gray(),
    };
    TypeColor::new(text, background)
}

/// A fuzzy search hit returned by [`KnowledgeBase::search`].
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeSearchResult {
    /// Identifier the entry is keyed by.
    pub name: String,
    /// The matched entry.
    pub entry: TypeDefinitionEntry,
    /// Matcher score, higher is better.
    pub score: i64,
}

/// Immutable-after-load map from identifier text to [`TypeDefinitionEntry`].
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, TypeDefinitionEntry>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a knowledge base from `(name, entry)` pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, TypeDefinitionEntry)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Built-in entries for common TypeScript and Rust library types.
    pub fn builtin() -> Self {
        let entries = [
            // TypeScript
            ("Promise", "interface", "Eventual result of an asynchronous operation"),
            ("Array", "interface", "Ordered, indexable list of values"),
            ("Record", "type", "Object type with keys K and values V"),
            ("Partial", "type", "Makes every property of T optional"),
            ("Readonly", "type", "Makes every property of T read-only"),
            ("Pick", "type", "Subset of T restricted to the keys K"),
            ("Omit", "type", "T without the keys K"),
            ("Map", "class", "Keyed collection that remembers insertion order"),
            ("Set", "class", "Collection of unique values"),
            ("HTMLElement", "interface", "Any HTML element in the DOM"),
            ("string", "keyword", "Primitive UTF-16 text type"),
            ("number", "keyword", "Primitive IEEE 754 double"),
            ("boolean", "keyword", "Primitive true/false type"),
            ("unknown", "keyword", "Type-safe counterpart of any"),
            // Rust
            ("Vec", "struct", "Contiguous growable array type"),
            ("Option", "enum", "Optional value: Some(T) or None"),
            ("Result", "enum", "Success value Ok(T) or error Err(E)"),
            ("String", "struct", "Owned, growable UTF-8 string"),
            ("HashMap", "struct", "Hash map with SipHash by default"),
            ("Box", "struct", "Owned heap allocation"),
            ("Arc", "struct", "Thread-safe reference-counted pointer"),
            ("Iterator", "trait", "Sequence of values produced by next()"),
        ];

        Self::from_entries(entries.iter().map(|(name, kind, description)| {
            (
                (*name).to_string(),
                TypeDefinitionEntry::new(kind, description),
            )
        }))
    }

    /// Load entries from a JSON or TOML file, chosen by extension.
    ///
    /// Files without a recognised extension are tried as JSON first, then TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "knowledge base {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let entries: BTreeMap<String, TypeDefinitionEntry> = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content).or_else(|_| toml::from_str(&content))?,
        };

        tracing::debug!(
            "Loaded {} knowledge base entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::from_entries(entries))
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Look up an identifier.
    pub fn get(&self, name: &str) -> Option<&TypeDefinitionEntry> {
        self.entries.get(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the knowledge base has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter_sorted(&self) -> Vec<(&str, &TypeDefinitionEntry)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    /// Fuzzy search over identifier names and kinds.
    pub fn search(&self, query: &str) -> Vec<KnowledgeSearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<KnowledgeSearchResult> = self
            .entries
            .iter()
            .filter_map(|(name, entry)| {
                let by_name = matcher.fuzzy_match(name, query);
                let by_description = matcher
                    .fuzzy_match(&entry.description, query)
                    .map(|score| score / 2);
                let score = by_name.max(by_description)?;
                Some(KnowledgeSearchResult {
                    name: name.clone(),
                    entry: entry.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        results
    }
}
