//! # hoverdoc-core
//!
//! Build-time half of hoverdoc: turns fenced code blocks in documentation
//! pages into highlighted HTML whose known identifiers carry tooltip payloads.
//!
//! ## Architecture
//!
//! One block flows through four stages:
//!
//! - **Tokenizer adapter** ([`tokenize`]): source text to tokens and
//!   diagnostics, never failing
//! - **Payload builder** ([`payload`]): tokens and diagnostics matched
//!   against the [`KnowledgeBase`], one payload per distinct token text
//! - **Highlighter** ([`highlight`]): source text to HTML spans
//! - **Annotator** ([`annotate`]): payloads spliced into the highlighted HTML
//!   as `tooltip-trigger` spans with a `data-tooltip` attribute
//!
//! [`CodeBlockPipeline`] runs the stages for one fence and
//! [`DocumentTransformer`] runs it over every opted-in fence of a markdown
//! page. The payload wire format lives in [`wire`] and is shared with the
//! browser-side runtime.
//!
//! ## Quick Start
//!
//! ```rust
//! use hoverdoc_core::{CodeBlockPipeline, DocumentTransformer, KnowledgeBase, Result};
//!
//! let pipeline = CodeBlockPipeline::new(KnowledgeBase::builtin());
//! let mut transformer = DocumentTransformer::new(pipeline)?;
//!
//! let page = "```ts hover\nconst users: Map<string, number> = new Map();\n```\n";
//! let out = transformer.transform(page)?;
//!
//! assert_eq!(out.report.annotated, 1);
//! assert!(out.document.contains("tooltip-trigger"));
//! # Ok::<(), hoverdoc_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Nothing inside the per-block pipeline aborts a build: parser failures,
//! encode failures and unplaceable tokens are logged and skipped. [`Result`]
//! is returned where files are read and configuration or knowledge bases
//! are loaded.

/// Markup annotator splicing triggers into highlighted HTML
pub mod annotate;
/// Configuration file and environment overrides
pub mod config;
/// Markdown page transform
pub mod document;
/// Error types and result aliases
pub mod error;
/// Fence hook and per-block pipeline
pub mod fence;
/// Highlighter trait and the default regex highlighter
pub mod highlight;
/// Type knowledge base
pub mod knowledge;
/// Tooltip payload builder
pub mod payload;
/// Tokenizer adapter and built-in source parsers
pub mod tokenize;
/// Payload wire format
pub mod wire;

// Re-export commonly used types
pub use annotate::{Annotated, annotate, annotate_with_stats};
pub use config::{Config, FenceConfig, KnowledgeBaseConfig, RuntimeConfig, TokenizerConfig};
pub use document::{DocumentTransformer, TransformReport, Transformed};
pub use error::{Error, Result};
pub use fence::{CodeBlockPipeline, FenceInfo, FenceRenderer, RenderedBlock};
pub use highlight::{Highlighter, RegexHighlighter};
pub use knowledge::{KnowledgeBase, KnowledgeSearchResult, TypeDefinitionEntry};
pub use payload::{PayloadMap, TooltipPayload};
pub use tokenize::{CharRange, Diagnostic, SourceParser, Token, TokenizeOutput, Tokenizer};
pub use wire::{Message, MessageKind, TypeColor, TypeInfo};
