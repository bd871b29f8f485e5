//! Syntax highlighting collaborator.
//!
//! The pipeline treats highlighting as a black box: code in, HTML out. The
//! only assumption the annotator makes about the HTML is that tokens sit
//! inside inline `<span>` elements. [`RegexHighlighter`] is the default
//! implementation; anything else can be plugged in through [`Highlighter`].

use crate::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::sync::LazyLock;

/// Code-to-HTML highlighter.
pub trait Highlighter: Send + Sync {
    /// Render `code` written in `language` as HTML.
    fn highlight(&self, code: &str, language: &str) -> Result<String>;
}

/// Build the single-pass tokenizer regex. Alternation order is precedence
/// order. Unterminated literals and block comments run to the end of the
/// line (or input) so they stay one span, matching the scanner's diagnostic
/// text.
fn token_regex(single_quoted: &str) -> Result<Regex> {
    Ok(Regex::new(&[
        r"(?P<comment>//[^\n]*|/\*(?s:.)*?(?:\*/|\z)|#[^\n]*)",
        r#"|(?P<string>"(?:\\.|[^"\\\n])*"?|`(?:\\.|[^`\\])*`?|"#,
        single_quoted,
        ")",
        r"|(?P<number>\b[0-9][0-9A-Za-z_.]*)",
        r"|(?P<word>[A-Za-z_$\p{Alphabetic}][0-9A-Za-z_$\p{Alphabetic}]*)",
        r"|(?P<punct>[^\s0-9A-Za-z_$\p{Alphabetic}])",
    ]
    .concat())?)
}

/// Web languages: single quotes delimit strings.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static WEB_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| token_regex(r"'(?:\\.|[^'\\\n])*'?").unwrap());

/// Rust: single quotes only delimit char literals, so lifetimes stay
/// punctuation plus identifier.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static RUST_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| token_regex(r"'(?:\\(?:u\{[0-9A-Fa-f]+\}|.)|[^'\\\n])'").unwrap());

const WEB_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "from",
    "function", "if", "implements", "import", "in", "instanceof", "interface", "keyof", "let",
    "new", "null", "of", "private", "protected", "public", "readonly", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "type", "typeof", "undefined", "var",
    "void", "while", "yield",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

/// Regex-driven HTML highlighter for C-family languages and Rust.
///
/// Every non-whitespace token is emitted as `<span class="hl-<class>">`, so
/// the annotator can find identifiers in the output. `#` line comments are
/// only recognised for shell-like languages.
#[derive(Debug, Clone, Default)]
pub struct RegexHighlighter;

impl RegexHighlighter {
    /// Create the highlighter.
    pub const fn new() -> Self {
        Self
    }

    fn rules(language: &str) -> (&'static Regex, &'static [&'static str]) {
        match language.to_ascii_lowercase().as_str() {
            "rust" | "rs" => (&*RUST_TOKEN_RE, RUST_KEYWORDS),
            _ => (&*WEB_TOKEN_RE, WEB_KEYWORDS),
        }
    }

    fn hash_comments(language: &str) -> bool {
        matches!(
            language.to_ascii_lowercase().as_str(),
            "sh" | "bash" | "shell" | "toml" | "yaml" | "yml" | "python" | "py"
        )
    }
}

impl Highlighter for RegexHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String> {
        let mut html = String::with_capacity(code.len() * 2);
        html.push_str(&open_block(language));
        let (regex, keywords) = Self::rules(language);
        let rules = Rules {
            regex,
            keywords,
            hash_comments: Self::hash_comments(language),
        };
        render_tokens(code, &rules, &mut html);
        html.push_str(CLOSE_BLOCK);
        Ok(html)
    }
}

struct Rules {
    regex: &'static Regex,
    keywords: &'static [&'static str],
    hash_comments: bool,
}

fn render_tokens(code: &str, rules: &Rules, html: &mut String) {
    let mut last = 0;
    for caps in rules.regex.captures_iter(code) {
        let Some(whole) = caps.get(0) else { continue };
        html.push_str(&encode_text(&code[last..whole.start()]));
        last = whole.end();

        let text = whole.as_str();
        if caps.name("comment").is_some() && text.starts_with('#') && !rules.hash_comments {
            // Only the `#` itself is punctuation; the rest is ordinary code.
            push_span(html, "punct", "#");
            render_tokens(&text[1..], rules, html);
            continue;
        }

        let class = if caps.name("comment").is_some() {
            "comment"
        } else if caps.name("string").is_some() {
            "string"
        } else if caps.name("number").is_some() {
            "number"
        } else if caps.name("word").is_some() {
            if rules.keywords.contains(&text) {
                "keyword"
            } else if text.starts_with(char::is_uppercase) {
                "type"
            } else {
                "identifier"
            }
        } else {
            "punct"
        };
        push_span(html, class, text);
    }
    html.push_str(&encode_text(&code[last..]));
}

fn push_span(html: &mut String, class: &str, text: &str) {
    html.push_str("<span class=\"hl-");
    html.push_str(class);
    html.push_str("\">");
    html.push_str(&encode_text(text));
    html.push_str("</span>");
}

const CLOSE_BLOCK: &str = "</code></pre>";

fn open_block(language: &str) -> String {
    format!(
        "<pre class=\"hoverdoc\"><code class=\"language-{}\">",
        encode_double_quoted_attribute(language)
    )
}

/// Plain escaped block used when a highlighter fails.
pub fn plain_block(code: &str, language: &str) -> String {
    format!("{}{}{CLOSE_BLOCK}", open_block(language), encode_text(code))
}
