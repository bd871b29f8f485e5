//! Lexical scanner for C-family languages (TypeScript, JavaScript, Vue SFC
//! script blocks and anything without a dedicated grammar).

use super::{CharRange, Diagnostic, SourceParser, Token, TokenizeOutput};
use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "declare", "default", "delete", "do", "else", "enum", "export", "extends",
    "false", "finally", "for", "from", "function", "get", "if", "implements", "import", "in",
    "instanceof", "interface", "keyof", "let", "namespace", "new", "null", "of", "private",
    "protected", "public", "readonly", "return", "satisfies", "set", "static", "super",
    "switch", "this", "throw", "true", "try", "type", "typeof", "undefined", "var", "void",
    "while", "with", "yield",
];

/// Hand-written scanner producing identifier, keyword, literal, comment and
/// punctuation tokens.
#[derive(Debug, Clone)]
pub struct LexicalParser {
    keywords: HashSet<&'static str>,
}

impl LexicalParser {
    /// Scanner with the TypeScript/JavaScript keyword set.
    pub fn new() -> Self {
        Self {
            keywords: KEYWORDS.iter().copied().collect(),
        }
    }
}

impl Default for LexicalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for LexicalParser {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn parse(&self, source: &str) -> TokenizeOutput {
        Scanner::new(source, &self.keywords).run()
    }
}

struct Scanner<'a> {
    chars: Vec<char>,
    pos: usize,
    keywords: &'a HashSet<&'static str>,
    output: TokenizeOutput,
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl<'a> Scanner<'a> {
    fn new(source: &str, keywords: &'a HashSet<&'static str>) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            keywords,
            output: TokenizeOutput::default(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn push(&mut self, start: usize, kind: &str) {
        self.output.tokens.push(Token {
            text: self.text(start, self.pos),
            range: CharRange::new(start, self.pos),
            kind: Some(kind.to_string()),
        });
    }

    fn unterminated(&mut self, start: usize, what: &str) {
        let text = self.text(start, self.pos);
        let first_line = text.lines().next().unwrap_or_default().to_string();
        self.output.diagnostics.push(Diagnostic {
            text: first_line,
            message: format!("Unterminated {what}"),
            range: Some(CharRange::new(start, self.pos)),
        });
    }

    fn run(mut self) -> TokenizeOutput {
        while let Some(c) = self.peek(0) {
            let start = self.pos;
            if c.is_whitespace() {
                self.pos += 1;
            } else if is_ident_start(c) || (!c.is_ascii() && c.is_alphabetic()) {
                self.identifier(start);
            } else if c.is_ascii_digit() {
                self.number(start);
            } else if c == '/' && self.peek(1) == Some('/') {
                while self.peek(0).is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
                self.push(start, "comment");
            } else if c == '/' && self.peek(1) == Some('*') {
                self.block_comment(start);
            } else if matches!(c, '"' | '\'' | '`') {
                self.string(start, c);
            } else {
                self.pos += 1;
                self.push(start, "punctuation");
            }
        }
        self.output
    }

    fn identifier(&mut self, start: usize) {
        while self
            .peek(0)
            .is_some_and(|c| is_ident_continue(c) || (!c.is_ascii() && c.is_alphanumeric()))
        {
            self.pos += 1;
        }
        let text = self.text(start, self.pos);
        let kind = if self.keywords.contains(text.as_str()) {
            "keyword"
        } else if text.starts_with(|c: char| c.is_uppercase()) {
            "type_identifier"
        } else {
            "identifier"
        };
        self.push(start, kind);
    }

    fn number(&mut self, start: usize) {
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            self.pos += 1;
        }
        self.push(start, "number");
    }

    fn block_comment(&mut self, start: usize) {
        self.pos += 2;
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    self.push(start, "comment");
                    return;
                },
                (Some(_), _) => self.pos += 1,
                (None, _) => {
                    self.unterminated(start, "block comment");
                    return;
                },
            }
        }
    }

    fn string(&mut self, start: usize, quote: char) {
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            match c {
                '\\' => self.pos += 2,
                '\n' if quote != '`' => break,
                c if c == quote => {
                    self.pos += 1;
                    self.push(start, "string");
                    return;
                },
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.chars.len());
        let what = if quote == '`' {
            "template literal"
        } else {
            "string literal"
        };
        self.unterminated(start, what);
    }
}
