//! Whole-page transform: replaces opted-in fenced code blocks in a markdown
//! document with annotated HTML.
//!
//! The page is parsed with the tree-sitter markdown grammar. Every
//! `fenced_code_block` is offered to a [`FenceRenderer`]; blocks it claims
//! are replaced by the returned HTML, everything else is copied byte for
//! byte. Replacement HTML is written on a single line (newlines inside the
//! code become `&#10;`) so a CommonMark renderer reading the page later sees
//! one uninterrupted HTML block.
//!
//! Fences nested in block quotes or list items are left alone: their
//! content carries container prefixes that are not part of the code.

use crate::fence::{FenceInfo, FenceRenderer};
use crate::{Error, Result};
use tree_sitter::{Node, Parser, TreeCursor};

/// Summary of one document transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Fenced code blocks found.
    pub blocks: usize,
    /// Blocks replaced with annotated HTML.
    pub annotated: usize,
    /// Trigger wrappers inserted across all blocks.
    pub triggers: usize,
    /// Tokenizer diagnostics across all annotated blocks.
    pub diagnostics: usize,
}

/// Transformed document plus its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// The rewritten markdown.
    pub document: String,
    /// What happened.
    pub report: TransformReport,
}

/// Markdown page transformer.
pub struct DocumentTransformer<R> {
    parser: Parser,
    renderer: R,
}

struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

impl<R: FenceRenderer> DocumentTransformer<R> {
    /// Create a transformer that offers fences to `renderer`.
    pub fn new(renderer: R) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_md::LANGUAGE.into())
            .map_err(|e| Error::Parse(format!("Failed to set language: {e}")))?;
        Ok(Self { parser, renderer })
    }

    /// The renderer fences are offered to.
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Transform one markdown document.
    pub fn transform(&mut self, markdown: &str) -> Result<Transformed> {
        let tree = self
            .parser
            .parse(markdown, None)
            .ok_or_else(|| Error::Parse("Failed to parse markdown".into()))?;

        let mut report = TransformReport::default();
        let mut edits = Vec::new();
        let mut cursor = tree.root_node().walk();
        walk_tree(&mut cursor, |node| {
            if node.kind() != "fenced_code_block" {
                return;
            }
            report.blocks += 1;
            if let Some(edit) = self.render_block(node, markdown, &mut report) {
                edits.push(edit);
            }
        });

        let mut document = String::with_capacity(markdown.len() * 2);
        let mut copied = 0;
        for edit in edits {
            document.push_str(&markdown[copied..edit.start]);
            document.push_str(&edit.replacement);
            copied = edit.end;
        }
        document.push_str(&markdown[copied..]);

        tracing::debug!(
            "Transformed document: {} blocks, {} annotated, {} triggers",
            report.blocks,
            report.annotated,
            report.triggers
        );
        Ok(Transformed { document, report })
    }

    fn render_block(
        &self,
        node: Node,
        markdown: &str,
        report: &mut TransformReport,
    ) -> Option<Edit> {
        if is_nested(node) {
            tracing::debug!(
                "Skipping nested fence at line {}",
                node.start_position().row + 1
            );
            return None;
        }

        let info = child_text(node, "info_string", markdown).unwrap_or_default();
        let source = child_text(node, "code_fence_content", markdown)
            .map(strip_final_newline)
            .unwrap_or_default();

        let block = self
            .renderer
            .render_fence(&FenceInfo::parse(info), source)?;
        report.annotated += 1;
        report.triggers += block.triggers;
        report.diagnostics += block.diagnostics;

        let original = &markdown[node.byte_range()];
        let body = original.trim_end_matches(['\n', '\r']);
        let trailing = &original[body.len()..];

        Some(Edit {
            start: node.start_byte(),
            end: node.end_byte(),
            replacement: format!("{}{trailing}", single_line(&block.html)),
        })
    }
}

impl<R> std::fmt::Debug for DocumentTransformer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentTransformer").finish_non_exhaustive()
    }
}

fn is_nested(node: Node) -> bool {
    let mut parent = node.parent();
    while let Some(p) = parent {
        if matches!(p.kind(), "block_quote" | "list_item") {
            return true;
        }
        parent = p.parent();
    }
    false
}

fn child_text<'a>(node: Node, kind: &str, source: &'a str) -> Option<&'a str> {
    let mut cursor = node.walk();
    let child = node
        .children(&mut cursor)
        .find(|child| child.kind() == kind)?;
    source.get(child.byte_range())
}

fn strip_final_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

fn single_line(html: &str) -> String {
    html.replace("\r\n", "&#10;").replace('\n', "&#10;")
}

fn walk_tree<F>(cursor: &mut TreeCursor, mut callback: F)
where
    F: FnMut(Node),
{
    loop {
        callback(cursor.node());

        if cursor.goto_first_child() {
            continue;
        }

        if cursor.goto_next_sibling() {
            continue;
        }

        loop {
            if !cursor.goto_parent() {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}
