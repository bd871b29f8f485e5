//! Fence hook: turns one fenced code block into annotated HTML.
//!
//! A markdown renderer hands every fence to a [`FenceRenderer`]. The
//! [`CodeBlockPipeline`] implementation only claims fences whose info string
//! carries the opt-in marker (`hover` by default); every other fence is left
//! to the renderer's default handling.
//!
//! For a claimed block the pipeline runs highlight, tokenize, payload build
//! and annotate, then wraps the result in the block container:
//!
//! ```text
//! <div class="hoverdoc-block" data-hoverdoc="ts"><pre class="hoverdoc">...</pre></div>
//! ```
//!
//! ```rust
//! use hoverdoc_core::fence::{CodeBlockPipeline, FenceInfo, FenceRenderer};
//! use hoverdoc_core::knowledge::{KnowledgeBase, TypeDefinitionEntry};
//!
//! let kb = KnowledgeBase::from_entries([(
//!     "Foo".to_string(),
//!     TypeDefinitionEntry::new("interface", "Example"),
//! )]);
//! let pipeline = CodeBlockPipeline::new(kb);
//!
//! let block = pipeline
//!     .render_fence(&FenceInfo::parse("ts hover"), "const x: Foo = bar();")
//!     .unwrap();
//! assert_eq!(block.triggers, 1);
//! assert!(block.html.starts_with(r#"<div class="hoverdoc-block" data-hoverdoc="ts">"#));
//!
//! assert!(pipeline.render_fence(&FenceInfo::parse("ts"), "const y = 1;").is_none());
//! ```

use crate::annotate::annotate_with_stats;
use crate::config::{Config, FenceConfig};
use crate::highlight::{self, Highlighter, RegexHighlighter};
use crate::knowledge::KnowledgeBase;
use crate::payload;
use crate::tokenize::Tokenizer;
use crate::Result;
use html_escape::encode_double_quoted_attribute;
use std::sync::Arc;

/// Language used when a fence has no info string.
pub const PLAIN_LANGUAGE: &str = "text";

/// Parsed fence info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceInfo {
    /// Language tag, as written.
    pub language: String,
    /// Remaining words, with `{`, `}` and `,` treated as separators.
    pub flags: Vec<String>,
}

impl FenceInfo {
    /// Parse an info string such as `ts hover`, `ts {hover}` or
    /// `{.rust hover title="x"}`.
    pub fn parse(info: &str) -> Self {
        let normalized: String = info
            .chars()
            .map(|c| if matches!(c, '{' | '}' | ',') { ' ' } else { c })
            .collect();
        let mut words = normalized.split_whitespace();
        let language = words
            .next()
            .map(|w| w.trim_start_matches('.'))
            .filter(|w| !w.is_empty())
            .unwrap_or(PLAIN_LANGUAGE)
            .to_string();
        Self {
            language,
            flags: words.map(str::to_string).collect(),
        }
    }

    /// Whether `flag` is present, ignoring ASCII case.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }
}

/// HTML for one block plus what happened while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// Final HTML.
    pub html: String,
    /// Whether the annotation pass ran.
    pub annotated: bool,
    /// Number of trigger wrappers inserted.
    pub triggers: usize,
    /// Number of tokenizer diagnostics for the block.
    pub diagnostics: usize,
}

/// Hook a markdown renderer calls for each fenced code block.
pub trait FenceRenderer {
    /// Replacement HTML for the fence, or `None` to keep the default
    /// rendering.
    fn render_fence(&self, info: &FenceInfo, source: &str) -> Option<RenderedBlock>;
}

/// Highlight, tokenize, build payloads and annotate one code block.
#[derive(Clone)]
pub struct CodeBlockPipeline {
    kb: Arc<KnowledgeBase>,
    tokenizer: Tokenizer,
    highlighter: Arc<dyn Highlighter>,
    fence: FenceConfig,
}

impl CodeBlockPipeline {
    /// Pipeline with the default tokenizer, highlighter and fence settings.
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            kb: Arc::new(kb),
            tokenizer: Tokenizer::new(),
            highlighter: Arc::new(RegexHighlighter::new()),
            fence: FenceConfig::default(),
        }
    }

    /// Pipeline built from configuration: knowledge base sources, aliases
    /// and fence settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            kb: Arc::new(config.knowledge_base()?),
            tokenizer: config.tokenizer(),
            highlighter: Arc::new(RegexHighlighter::new()),
            fence: config.fence.clone(),
        })
    }

    /// Replace the highlighter.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Replace the tokenizer.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Replace the fence settings.
    #[must_use]
    pub fn with_fence(mut self, fence: FenceConfig) -> Self {
        self.fence = fence;
        self
    }

    /// Knowledge base shared by every block.
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Fence settings in use.
    pub const fn fence(&self) -> &FenceConfig {
        &self.fence
    }

    /// Whether a fence opts into annotation.
    pub fn opts_in(&self, info: &FenceInfo) -> bool {
        info.has_flag(&self.fence.marker)
    }

    /// Render a block: annotated and wrapped when the fence opts in, plain
    /// highlighter output otherwise.
    pub fn render(&self, source: &str, info: &FenceInfo) -> RenderedBlock {
        if self.opts_in(info) {
            self.render_annotated(source, &info.language)
        } else {
            RenderedBlock {
                html: self.highlight(source, &info.language),
                annotated: false,
                triggers: 0,
                diagnostics: 0,
            }
        }
    }

    /// Render a block with annotation regardless of the fence marker.
    pub fn render_annotated(&self, source: &str, language: &str) -> RenderedBlock {
        let highlighted = self.highlight(source, language);
        let output = self.tokenizer.tokenize(source, language);
        let payloads = payload::build(&output.tokens, &output.diagnostics, &self.kb);
        let annotated = annotate_with_stats(&highlighted, &payloads);

        tracing::debug!(
            "Annotated {language} block: {} tokens, {} payloads, {} triggers",
            output.tokens.len(),
            payloads.len(),
            annotated.triggers
        );

        RenderedBlock {
            html: self.wrap(&annotated.html, language),
            annotated: true,
            triggers: annotated.triggers,
            diagnostics: output.diagnostics.len(),
        }
    }

    fn highlight(&self, source: &str, language: &str) -> String {
        self.highlighter
            .highlight(source, language)
            .unwrap_or_else(|e| {
                tracing::warn!("Highlighter failed on a {language} block, using plain text: {e}");
                highlight::plain_block(source, language)
            })
    }

    fn wrap(&self, html: &str, language: &str) -> String {
        format!(
            "<div class=\"{}\" {}=\"{}\">{html}</div>",
            encode_double_quoted_attribute(&self.fence.container_class),
            self.fence.container_attribute,
            encode_double_quoted_attribute(&language.to_ascii_lowercase()),
        )
    }
}

impl FenceRenderer for CodeBlockPipeline {
    fn render_fence(&self, info: &FenceInfo, source: &str) -> Option<RenderedBlock> {
        self.opts_in(info)
            .then(|| self.render_annotated(source, &info.language))
    }
}

impl std::fmt::Debug for CodeBlockPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBlockPipeline")
            .field("entries", &self.kb.len())
            .field("tokenizer", &self.tokenizer)
            .field("fence", &self.fence)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::knowledge::TypeDefinitionEntry;

    struct FailingHighlighter;

    impl Highlighter for FailingHighlighter {
        fn highlight(&self, _code: &str, _language: &str) -> Result<String> {
            Err(Error::Highlight("no rules".into()))
        }
    }

    fn pipeline() -> CodeBlockPipeline {
        CodeBlockPipeline::new(KnowledgeBase::from_entries([(
            "Foo".to_string(),
            TypeDefinitionEntry::new("interface", "Example"),
        )]))
    }

    #[test]
    fn test_parse_info_forms() {
        let plain = FenceInfo::parse("ts hover");
        let braced = FenceInfo::parse("ts {hover}");
        let attrs = FenceInfo::parse("{.rust hover, title=\"x\"}");

        assert_eq!(plain.language, "ts");
        assert!(plain.has_flag("hover"));
        assert_eq!(braced.language, "ts");
        assert!(braced.has_flag("HOVER"));
        assert_eq!(attrs.language, "rust");
        assert_eq!(attrs.flags, vec!["hover", "title=\"x\""]);
    }

    #[test]
    fn test_empty_info_is_plain_text() {
        let info = FenceInfo::parse("   ");
        assert_eq!(info.language, PLAIN_LANGUAGE);
        assert!(info.flags.is_empty());
    }

    #[test]
    fn test_unmarked_block_is_plain_highlighter_output() {
        let pipeline = pipeline();
        let info = FenceInfo::parse("ts");

        let block = pipeline.render("const x: Foo = 1;", &info);

        assert!(!block.annotated);
        assert_eq!(
            block.html,
            RegexHighlighter::new()
                .highlight("const x: Foo = 1;", "ts")
                .unwrap()
        );
    }

    #[test]
    fn test_marked_block_is_wrapped_and_annotated() {
        let block = pipeline().render("const x: Foo = bar();", &FenceInfo::parse("TS hover"));

        assert!(block.annotated);
        assert_eq!(block.triggers, 1);
        assert_eq!(block.diagnostics, 0);
        assert!(block.html.starts_with(r#"<div class="hoverdoc-block" data-hoverdoc="ts">"#));
        assert!(block.html.ends_with("</div>"));
    }

    #[test]
    fn test_custom_marker() {
        let pipeline = pipeline().with_fence(FenceConfig {
            marker: "tips".into(),
            ..FenceConfig::default()
        });

        assert!(pipeline.render_fence(&FenceInfo::parse("ts hover"), "Foo").is_none());
        assert!(pipeline.render_fence(&FenceInfo::parse("ts tips"), "Foo").is_some());
    }

    #[test]
    fn test_highlighter_failure_falls_back_to_plain_block() {
        // Given: A highlighter that always fails
        let pipeline = pipeline().with_highlighter(Arc::new(FailingHighlighter));

        // When: Rendering an opted-in block
        let block = pipeline.render_annotated("let a: Foo;", "ts");

        // Then: The block still renders, without spans and so without triggers
        assert!(block.html.contains("let a: Foo;"));
        assert_eq!(block.triggers, 0);
    }

    #[test]
    fn test_diagnostics_are_counted() {
        let block = pipeline().render_annotated("const s = 'oops", "ts");

        assert_eq!(block.diagnostics, 1);
        assert!(block.html.contains("has-error"));
    }
}
