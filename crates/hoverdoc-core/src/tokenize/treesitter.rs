use super::{CharOffsets, CharRange, Diagnostic, SourceParser, Token, TokenizeOutput};
use crate::{Error, Result};
use tree_sitter::{Language, Node, Parser, TreeCursor};

/// Grammar-backed parser: every leaf of the syntax tree becomes a token,
/// `ERROR` and `MISSING` nodes become diagnostics.
#[derive(Clone)]
pub struct TreeSitterParser {
    name: &'static str,
    language: Language,
}

impl TreeSitterParser {
    /// Parser for an arbitrary tree-sitter grammar.
    pub fn new(name: &'static str, language: Language) -> Self {
        Self { name, language }
    }

    /// Parser for `language`, checked against the linked tree-sitter runtime.
    ///
    /// Fails with [`Error::Tokenize`] when the grammar was generated for an
    /// incompatible ABI version.
    pub fn try_new(name: &'static str, language: Language) -> Result<Self> {
        Parser::new()
            .set_language(&language)
            .map_err(|e| Error::Tokenize(format!("{name}: {e}")))?;
        Ok(Self::new(name, language))
    }

    /// Rust grammar.
    pub fn rust() -> Self {
        Self::new("tree-sitter-rust", tree_sitter_rust::LANGUAGE.into())
    }

    fn diagnostic(node: Node, source: &str, offsets: &CharOffsets) -> Diagnostic {
        let range = CharRange::new(
            offsets.char_at(node.start_byte()),
            offsets.char_at(node.end_byte()),
        );
        if node.is_missing() {
            return Diagnostic {
                text: String::new(),
                message: format!("Missing {}", node.kind()),
                range: Some(range),
            };
        }
        let text = source[node.byte_range()]
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        Diagnostic {
            text,
            message: "Syntax error".to_string(),
            range: Some(range),
        }
    }
}

impl std::fmt::Debug for TreeSitterParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterParser")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SourceParser for TreeSitterParser {
    fn name(&self) -> &'static str {
        self.name
    }

    fn parse(&self, source: &str) -> TokenizeOutput {
        let mut output = TokenizeOutput::default();
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&self.language) {
            output.diagnostics.push(Diagnostic {
                text: String::new(),
                message: format!("Failed to set language: {e}"),
                range: None,
            });
            return output;
        }
        let Some(tree) = parser.parse(source, None) else {
            output.diagnostics.push(Diagnostic {
                text: String::new(),
                message: "Parser returned no tree".to_string(),
                range: None,
            });
            return output;
        };

        let offsets = CharOffsets::new(source);
        let mut cursor = tree.root_node().walk();
        walk_tree(&mut cursor, |node| {
            if node.is_error() || node.is_missing() {
                output
                    .diagnostics
                    .push(Self::diagnostic(node, source, &offsets));
            }
            if node.child_count() == 0 && node.end_byte() > node.start_byte() {
                output.tokens.push(Token {
                    text: source[node.byte_range()].to_string(),
                    range: CharRange::new(
                        offsets.char_at(node.start_byte()),
                        offsets.char_at(node.end_byte()),
                    ),
                    kind: Some(node.kind().to_string()),
                });
            }
        });

        output
    }
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_leaves_become_tokens() {
        // Given: A small Rust item
        let parser = TreeSitterParser::rust();

        // When: Parsing it
        let output = parser.parse("fn load(id: UserId) -> Option<User> { None }");

        // Then: Identifiers and type identifiers come out as tokens
        let user = output.tokens.iter().find(|t| t.text == "User").unwrap();
        assert_eq!(user.kind.as_deref(), Some("type_identifier"));
        assert_eq!(user.range, CharRange::new(30, 34));
        assert!(output.tokens.iter().any(|t| t.text == "Option"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_try_new_accepts_bundled_grammar() {
        let parser = TreeSitterParser::try_new("rust", tree_sitter_rust::LANGUAGE.into()).unwrap();

        let output = parser.parse("struct User;");

        assert!(output.tokens.iter().any(|t| t.text == "User"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_syntax_errors_become_diagnostics() {
        let parser = TreeSitterParser::rust();

        let output = parser.parse("fn broken( { let = ; }");

        assert!(!output.diagnostics.is_empty());
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.message == "Syntax error" || d.message.starts_with("Missing"))
        );
    }
}
