//! Markup annotator: wraps known tokens in highlighted HTML with tooltip
//! triggers.
//!
//! The highlighter's HTML is scanned into tags and text runs. Only text whose
//! innermost enclosing element is a highlighter `<span>` is eligible, and
//! never text that already sits inside a `tooltip-trigger` span, which makes
//! the pass idempotent. Inside an eligible run, occurrences of payload keys
//! are found with one combined regex whose alternatives are ordered longest
//! first, then checked for whole-word boundaries and wrapped:
//!
//! ```text
//! <span class="hl-type">UserService</span>
//! <span class="hl-type"><span class="tooltip-trigger" data-tooltip="...">UserService</span></span>
//! ```
//!
//! String literals and comments are single tokens to the tokenizer, so a
//! span whose class names one (`hl-string`, `hljs-comment`, `token string`)
//! is matched as a whole: a key is wrapped there only when it equals the
//! span's entire text, as a diagnostic on an unterminated string does.
//!
//! Everything outside the wrapped occurrences is copied through byte for
//! byte. A key whose text is never found in an eligible run is skipped.

use crate::payload::PayloadMap;
use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Class carried by every trigger element.
pub const TRIGGER_CLASS: &str = "tooltip-trigger";
/// Extra class for triggers whose payload has errors.
pub const ERROR_CLASS: &str = "has-error";
/// Attribute holding the encoded payload.
pub const PAYLOAD_ATTRIBUTE: &str = "data-tooltip";

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#).unwrap()
});

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Class suffixes of highlighter spans holding one opaque literal.
const LITERAL_CLASS_SUFFIXES: &[&str] = &["string", "comment"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Result of one annotation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    /// Rewritten HTML.
    pub html: String,
    /// Number of trigger wrappers inserted.
    pub triggers: usize,
    /// Payload keys that were never placed.
    pub unplaced: Vec<String>,
}

/// Annotate `html` with the payloads in `payloads`.
pub fn annotate(html: &str, payloads: &PayloadMap) -> String {
    annotate_with_stats(html, payloads).html
}

/// Like [`annotate`], also reporting how many triggers were inserted.
pub fn annotate_with_stats(html: &str, payloads: &PayloadMap) -> Annotated {
    let Some(candidates) = Candidates::new(payloads) else {
        return Annotated {
            html: html.to_string(),
            triggers: 0,
            unplaced: payloads.keys().cloned().collect(),
        };
    };

    let mut out = String::with_capacity(html.len() + html.len() / 2);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut placed = BTreeSet::new();
    let mut triggers = 0;
    let mut pos = 0;
    let bytes = html.as_bytes();

    while pos < html.len() {
        let next_tag = memchr::memchr(b'<', &bytes[pos..]).map_or(html.len(), |i| pos + i);

        if next_tag > pos {
            let text = &html[pos..next_tag];
            if is_eligible(&stack) {
                triggers += if stack.last().is_some_and(|top| top.literal) {
                    candidates.wrap_whole(text, &mut out, &mut placed)
                } else {
                    candidates.wrap_run(text, &mut out, &mut placed)
                };
            } else {
                out.push_str(text);
            }
            pos = next_tag;
            continue;
        }

        let end = tag_end(html, pos);
        let tag = &html[pos..end];
        out.push_str(tag);
        track_tag(tag, &mut stack);
        pos = end;
    }

    let unplaced: Vec<String> = payloads
        .keys()
        .filter(|key| !placed.contains(key.as_str()))
        .cloned()
        .collect();
    if !unplaced.is_empty() {
        tracing::debug!("No highlighter span found for {unplaced:?}; left unannotated");
    }

    Annotated {
        html: out,
        triggers,
        unplaced,
    }
}

struct OpenElement {
    name: String,
    trigger: bool,
    literal: bool,
}

fn is_eligible(stack: &[OpenElement]) -> bool {
    stack.last().is_some_and(|top| top.name == "span") && !stack.iter().any(|e| e.trigger)
}

/// One payload key prepared for matching.
struct Candidate<'a> {
    key: &'a str,
    escaped: String,
    attribute: String,
    has_error: bool,
}

struct Candidates<'a> {
    /// Longest escaped form first.
    ordered: Vec<Candidate<'a>>,
    regex: Regex,
}

impl<'a> Candidates<'a> {
    fn new(payloads: &'a PayloadMap) -> Option<Self> {
        let mut ordered: Vec<Candidate<'a>> = payloads
            .iter()
            .filter(|(key, payload)| !key.is_empty() && !payload.is_empty())
            .map(|(key, payload)| Candidate {
                key: key.as_str(),
                escaped: encode_text(key).into_owned(),
                attribute: encode_double_quoted_attribute(&payload.encode()).into_owned(),
                has_error: payload.has_errors(),
            })
            .collect();
        if ordered.is_empty() {
            return None;
        }
        ordered.sort_by(|a, b| {
            b.escaped
                .len()
                .cmp(&a.escaped.len())
                .then_with(|| a.escaped.cmp(&b.escaped))
        });

        let alternation = ordered
            .iter()
            .map(|c| regex::escape(&c.escaped))
            .collect::<Vec<_>>()
            .join("|");
        match Regex::new(&alternation) {
            Ok(regex) => Some(Self { ordered, regex }),
            Err(e) => {
                tracing::warn!("Could not build annotation pattern, leaving block as is: {e}");
                None
            },
        }
    }

    /// Copy `text` into `out`, wrapping every whole-word occurrence.
    fn wrap_run(&self, text: &str, out: &mut String, placed: &mut BTreeSet<&'a str>) -> usize {
        let entities: Vec<(usize, usize)> = ENTITY_RE
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();
        let mut wrapped = 0;
        let mut copied = 0;
        let mut at = 0;

        while let Some(found) = self.regex.find_at(text, at) {
            let start = found.start();
            match self.accept_at(text, start, &entities) {
                Some(candidate) => {
                    let end = start + candidate.escaped.len();
                    out.push_str(&text[copied..start]);
                    push_trigger(out, candidate, &text[start..end]);
                    placed.insert(candidate.key);
                    wrapped += 1;
                    copied = end;
                    at = end;
                },
                None => {
                    at = start + text[start..].chars().next().map_or(1, char::len_utf8);
                },
            }
            if at >= text.len() {
                break;
            }
        }

        out.push_str(&text[copied..]);
        wrapped
    }

    /// Copy a literal run into `out`, wrapping it only if it is a key.
    fn wrap_whole(&self, text: &str, out: &mut String, placed: &mut BTreeSet<&'a str>) -> usize {
        match self.ordered.iter().find(|candidate| candidate.escaped == text) {
            Some(candidate) => {
                push_trigger(out, candidate, text);
                placed.insert(candidate.key);
                1
            },
            None => {
                out.push_str(text);
                0
            },
        }
    }

    /// Longest candidate that occurs at `start` as a whole word.
    fn accept_at(
        &self,
        text: &str,
        start: usize,
        entities: &[(usize, usize)],
    ) -> Option<&Candidate<'a>> {
        let before = text[..start].chars().next_back();
        if before.is_some_and(is_word_char) && starts_with_word_char(&text[start..]) {
            return None;
        }
        self.ordered.iter().find(|candidate| {
            let end = start + candidate.escaped.len();
            text[start..].starts_with(&candidate.escaped)
                && !splits_entity(start, end, entities)
                && !(ends_with_word_char(&candidate.escaped)
                    && text[end..].chars().next().is_some_and(is_word_char))
                && !(before.is_some_and(is_word_char) && starts_with_word_char(&candidate.escaped))
        })
    }
}

fn push_trigger(out: &mut String, candidate: &Candidate<'_>, text: &str) {
    out.push_str("<span class=\"");
    out.push_str(TRIGGER_CLASS);
    if candidate.has_error {
        out.push(' ');
        out.push_str(ERROR_CLASS);
    }
    out.push_str("\" ");
    out.push_str(PAYLOAD_ATTRIBUTE);
    out.push_str("=\"");
    out.push_str(&candidate.attribute);
    out.push_str("\">");
    out.push_str(text);
    out.push_str("</span>");
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn starts_with_word_char(s: &str) -> bool {
    s.chars().next().is_some_and(is_word_char)
}

fn ends_with_word_char(s: &str) -> bool {
    s.chars().next_back().is_some_and(is_word_char)
}

/// Whether `[start, end)` cuts through an entity such as `&amp;`.
fn splits_entity(start: usize, end: usize, entities: &[(usize, usize)]) -> bool {
    entities.iter().any(|&(e_start, e_end)| {
        let overlaps = start < e_end && e_start < end;
        let contains = start <= e_start && e_end <= end;
        overlaps && !contains
    })
}

/// Byte index just past the tag, comment or stray `<` starting at `start`.
fn tag_end(html: &str, start: usize) -> usize {
    let rest = &html[start..];
    if rest.starts_with("<!--") {
        return rest
            .find("-->")
            .map_or(html.len(), |i| start + i + "-->".len());
    }

    let bytes = rest.as_bytes();
    // `<` not followed by a tag name or `/`, `!`, `?` is text that slipped
    // through unescaped; treat it as a one-byte tag so it is copied as-is.
    if !bytes
        .get(1)
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
    {
        return start + 1;
    }

    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), b) if b == q => quote = None,
            (None, b'>') => return start + i + 1,
            _ => {},
        }
    }
    html.len()
}

fn tag_name(tag: &str) -> (bool, String) {
    let inner = tag.trim_start_matches('<');
    let (closing, inner) = inner
        .strip_prefix('/')
        .map_or((false, inner), |rest| (true, rest));
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    (closing, name)
}

fn classes(tag: &str) -> impl Iterator<Item = &str> {
    CLASS_ATTR_RE.captures_iter(tag).flat_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |value| value.as_str())
            .split_whitespace()
    })
}

fn track_tag(tag: &str, stack: &mut Vec<OpenElement>) {
    if tag.len() < 2 || tag.starts_with("<!") || tag.starts_with("<?") {
        return;
    }
    let (closing, name) = tag_name(tag);
    if name.is_empty() {
        return;
    }
    if closing {
        if let Some(index) = stack.iter().rposition(|e| e.name == name) {
            stack.truncate(index);
        }
        return;
    }
    if tag.ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str()) {
        return;
    }
    let span = name == "span";
    let trigger = span && classes(tag).any(|class| class == TRIGGER_CLASS);
    let literal = span
        && classes(tag).any(|class| {
            LITERAL_CLASS_SUFFIXES
                .iter()
                .any(|suffix| class.ends_with(suffix))
        });
    stack.push(OpenElement {
        name,
        trigger,
        literal,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::payload::TooltipPayload;
    use crate::wire::{Message, TypeInfo};

    fn info_payload(kind: &str) -> TooltipPayload {
        let mut payload = TooltipPayload::default();
        payload.add_info(Message::type_info(TypeInfo::fallback(kind)));
        payload
    }

    fn payloads(keys: &[&str]) -> PayloadMap {
        keys.iter()
            .map(|k| ((*k).to_string(), info_payload("type")))
            .collect()
    }

    fn count_triggers(html: &str) -> usize {
        html.matches(TRIGGER_CLASS).count()
    }

    #[test]
    fn test_wraps_token_inside_span() {
        // Given: A highlighted span holding a known type
        let html = r#"<code><span class="hl-type">Foo</span></code>"#;

        // When: Annotating
        let out = annotate_with_stats(html, &payloads(&["Foo"]));

        // Then: The span is preserved and the text wrapped inside it
        assert_eq!(out.triggers, 1);
        assert!(out.html.starts_with(
            r#"<code><span class="hl-type"><span class="tooltip-trigger" data-tooltip=""#
        ));
        assert!(out.html.ends_with(">Foo</span></span></code>"));
    }

    #[test]
    fn test_prefix_and_suffix_inside_span_are_kept() {
        let html = r#"<span class="line">let a = Foo(b);</span>"#;

        let out = annotate(html, &payloads(&["Foo"]));

        assert!(out.starts_with(r#"<span class="line">let a = <span class="tooltip-trigger""#));
        assert!(out.ends_with(">Foo</span>(b);</span>"));
    }

    #[test]
    fn test_every_occurrence_in_one_run_is_wrapped() {
        let html = r#"<span class="line">Foo | Foo</span>"#;

        let out = annotate_with_stats(html, &payloads(&["Foo"]));

        assert_eq!(out.triggers, 2);
    }

    #[test]
    fn test_text_outside_spans_is_untouched() {
        let html = "<code>Foo</code><span>Foo</span>";

        let out = annotate_with_stats(html, &payloads(&["Foo"]));

        assert_eq!(out.triggers, 1);
        assert!(out.html.starts_with("<code>Foo</code><span>"));
    }

    #[test]
    fn test_whole_words_only() {
        let html = "<span>Foobar barFoo Foo_1 $Foo Foo</span>";

        let out = annotate_with_stats(html, &payloads(&["Foo"]));

        assert_eq!(out.triggers, 1);
        assert!(out.html.ends_with(">Foo</span></span>"));
    }

    #[test]
    fn test_longest_key_wins() {
        // Given: Keys where one is a prefix of the other
        let html = "<span>UserService</span> <span>User</span>";

        // When: Annotating with both keys
        let out = annotate_with_stats(html, &payloads(&["User", "UserService"]));

        // Then: Two wrappers, the first around the full name
        assert_eq!(out.triggers, 2);
        assert!(out.html.contains(">UserService</span></span>"));
        assert!(!out.html.contains(">User</span>Service"));
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let html = r#"<span class="hl-type">Foo</span> <span>x Foo</span>"#;
        let map = payloads(&["Foo"]);

        let once = annotate(html, &map);
        let twice = annotate(&once, &map);

        assert_eq!(once, twice);
        assert_eq!(count_triggers(&twice), 2);
    }

    #[test]
    fn test_entities_are_not_split() {
        let html = "<span>&amp; amp &lt;T&gt;</span>";

        let out = annotate_with_stats(html, &payloads(&["amp", "lt"]));

        assert_eq!(out.triggers, 1);
        assert!(out.html.starts_with("<span>&amp; <span class=\"tooltip-trigger\""));
        assert!(out.html.ends_with(">amp</span> &lt;T&gt;</span>"));
    }

    #[test]
    fn test_keys_with_markup_chars_match_escaped_text() {
        let html = "<span>Array&lt;T&gt;</span>";

        let out = annotate_with_stats(html, &payloads(&["Array<T>"]));

        assert_eq!(out.triggers, 1);
        assert!(out.html.contains(">Array&lt;T&gt;</span></span>"));
    }

    #[test]
    fn test_error_payload_adds_class() {
        let mut payload = TooltipPayload::default();
        payload.add_error("Cannot find name 'bar'");
        let map: PayloadMap = [("bar".to_string(), payload)].into_iter().collect();

        let out = annotate("<span>bar</span>", &map);

        assert!(out.contains(r#"class="tooltip-trigger has-error""#));
    }

    #[test]
    fn test_unplaced_keys_are_reported() {
        let out = annotate_with_stats("<pre>Foo</pre>", &payloads(&["Foo"]));

        assert_eq!(out.html, "<pre>Foo</pre>");
        assert_eq!(out.unplaced, vec!["Foo".to_string()]);
    }

    #[test]
    fn test_attributes_with_angle_brackets_are_not_text() {
        let html = r#"<span title="a > Foo">Foo</span>"#;

        let out = annotate_with_stats(html, &payloads(&["Foo"]));

        assert_eq!(out.triggers, 1);
        assert!(out.html.starts_with(r#"<span title="a > Foo"><span class="tooltip-trigger""#));
    }

    #[test]
    fn test_empty_payload_map_is_identity() {
        let html = "<span>Foo</span>";
        assert_eq!(annotate(html, &PayloadMap::new()), html);
    }

    #[test]
    fn test_names_inside_strings_and_comments_are_not_wrapped() {
        // Given: A known name in a string, a comment and as a type
        let html = concat!(
            r#"<span class="hl-string">"Foo"</span> "#,
            r#"<span class="hl-comment">// Foo</span> "#,
            r#"<span class="token comment">/* Foo */</span> "#,
            r#"<span class="hl-type">Foo</span>"#,
        );

        // When: Annotating
        let out = annotate_with_stats(html, &payloads(&["Foo"]));

        // Then: Only the type occurrence is a trigger
        assert_eq!(out.triggers, 1);
        assert!(out.html.starts_with(concat!(
            r#"<span class="hl-string">"Foo"</span> "#,
            r#"<span class="hl-comment">// Foo</span> "#,
            r#"<span class="token comment">/* Foo */</span> "#,
        )));
        assert!(out.html.ends_with(">Foo</span></span>"));
    }

    #[test]
    fn test_whole_literal_key_is_wrapped() {
        let mut payload = TooltipPayload::default();
        payload.add_error("Unterminated string literal");
        let map: PayloadMap = [("'oops".to_string(), payload)].into_iter().collect();

        let out = annotate_with_stats(r#"<span class="hl-string">'oops</span>"#, &map);

        assert_eq!(out.triggers, 1);
        assert!(out.html.contains(r#"class="tooltip-trigger has-error""#));
        assert!(out.html.ends_with(">'oops</span></span>"));
    }

    #[test]
    fn test_tag_end_handles_stray_lt() {
        assert_eq!(tag_end("a < b", 2), 3);
        assert_eq!(tag_end("<!-- x > y -->z", 0), 14);
    }
}
