//! Wire format for tooltip payloads.
//!
//! A payload travels from the build step to the browser as one HTML attribute
//! value. It is a list of segments joined by `|||`; each segment is
//! `<kind>:::<body>` with `kind` one of `error`, `warning`, `info`, `success`.
//! An `info` body may carry a structured type record after a `\ntype:` marker:
//!
//! ```text
//! error:::Cannot find name 'bar'|||info:::interface
//! type:%7B%22type%22%3A%22interface%22%2C...%7D
//! ```
//!
//! Message bodies are percent-escaped for `%`, `|`, control characters and
//! non-ASCII bytes, so the encoded string is plain ASCII and the separators
//! stay unambiguous. The type record is JSON, percent-encoded the way
//! `encodeURIComponent` does it.
//!
//! [`encode`] and [`decode`] are the only two places the format is produced
//! and consumed.

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Separator between segments.
pub const SEGMENT_SEPARATOR: &str = "|||";
/// Separator between a segment's kind and its body.
pub const KIND_SEPARATOR: &str = ":::";
/// Marker introducing the structured type record inside an `info` body.
pub const TYPE_MARKER: &str = "\ntype:";
/// Description used when a type record has to be synthesised.
pub const NO_DESCRIPTION: &str = "No description available";

/// Bytes escaped inside message bodies.
const BODY_ESCAPE: &AsciiSet = &CONTROLS.add(b'%').add(b'|');

/// Bytes escaped in the type record, matching `encodeURIComponent`.
const COMPONENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Failures decoding a single segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Segment has no `:::` separator.
    #[error("segment has no kind separator")]
    MissingKind,
    /// Segment kind is not one of the four known kinds.
    #[error("unknown message kind '{0}'")]
    UnknownKind(String),
    /// The `type:` record is not valid JSON for a [`TypeInfo`].
    #[error("invalid type record: {0}")]
    TypeRecord(String),
}

/// Text and background colour for a type chip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeColor {
    /// Foreground CSS colour.
    pub text: String,
    /// Background CSS colour.
    pub background: String,
}

impl TypeColor {
    /// Create a colour pair.
    pub fn new(text: &str, background: &str) -> Self {
        Self {
            text: text.to_string(),
            background: background.to_string(),
        }
    }

    /// Neutral gray used for unknown kinds and fallbacks.
    pub fn default_gray() -> Self {
        Self::new("#6b7280", "#f3f4f6")
    }
}

/// Structured type record rendered as a coloured chip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Kind label (`interface`, `class`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Chip colours.
    pub color: TypeColor,
    /// Description shown after the chip.
    pub description: String,
}

impl TypeInfo {
    /// Minimal record used when the real one cannot be encoded.
    pub fn fallback(raw: &str) -> Self {
        Self {
            kind: raw.to_string(),
            color: TypeColor::default_gray(),
            description: NO_DESCRIPTION.to_string(),
        }
    }

    fn to_component(&self) -> Result<String, WireError> {
        let json =
            serde_json::to_string(self).map_err(|e| WireError::TypeRecord(e.to_string()))?;
        Ok(utf8_percent_encode(&json, COMPONENT_ESCAPE).to_string())
    }

    fn from_component(component: &str) -> Result<Self, WireError> {
        let json = percent_decode_str(component)
            .decode_utf8()
            .map_err(|e| WireError::TypeRecord(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| WireError::TypeRecord(e.to_string()))
    }
}

/// The four message kinds understood by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    /// Diagnostic reported by the parser.
    Error,
    /// Non-fatal diagnostic.
    Warning,
    /// Knowledge-base information.
    Info,
    /// Positive confirmation.
    Success,
}

impl MessageKind {
    /// Wire tag for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }

    /// Parse a wire tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tooltip message.
///
/// `Plain` never appears in payloads produced by the builder; [`decode`]
/// uses it for segments it cannot interpret so they are shown rather than
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Message {
    /// Error text.
    Error(String),
    /// Warning text.
    Warning(String),
    /// Info label with an optional structured type record.
    Info {
        /// Text shown when no chip is rendered.
        label: String,
        /// Structured record for the chip.
        type_info: Option<TypeInfo>,
    },
    /// Success text.
    Success(String),
    /// Raw, uninterpreted segment.
    Plain(String),
}

impl Message {
    /// Info message carrying a type record.
    pub fn type_info(info: TypeInfo) -> Self {
        Self::Info {
            label: info.kind.clone(),
            type_info: Some(info),
        }
    }

    /// Kind of this message, `None` for `Plain`.
    pub const fn kind(&self) -> Option<MessageKind> {
        match self {
            Self::Error(_) => Some(MessageKind::Error),
            Self::Warning(_) => Some(MessageKind::Warning),
            Self::Info { .. } => Some(MessageKind::Info),
            Self::Success(_) => Some(MessageKind::Success),
            Self::Plain(_) => None,
        }
    }

    /// Encode as a single wire segment.
    pub fn encode(&self) -> String {
        match self {
            Self::Error(text) => tagged(MessageKind::Error, text),
            Self::Warning(text) => tagged(MessageKind::Warning, text),
            Self::Success(text) => tagged(MessageKind::Success, text),
            Self::Info { label, type_info } => {
                let mut segment = tagged(MessageKind::Info, label);
                if let Some(info) = type_info {
                    let component = info.to_component().or_else(|err| {
                        tracing::warn!("Falling back to minimal type record for '{label}': {err}");
                        TypeInfo::fallback(label).to_component()
                    });
                    if let Ok(component) = component {
                        segment.push_str(TYPE_MARKER);
                        segment.push_str(&component);
                    }
                }
                segment
            },
            Self::Plain(text) => escape_body(text),
        }
    }

    /// Decode a single wire segment.
    pub fn decode_segment(segment: &str) -> Result<Self, WireError> {
        let (tag, body) = segment
            .split_once(KIND_SEPARATOR)
            .ok_or(WireError::MissingKind)?;
        let kind = MessageKind::parse(tag).ok_or_else(|| WireError::UnknownKind(tag.into()))?;

        Ok(match kind {
            MessageKind::Error => Self::Error(unescape_body(body)),
            MessageKind::Warning => Self::Warning(unescape_body(body)),
            MessageKind::Success => Self::Success(unescape_body(body)),
            MessageKind::Info => match body.split_once(TYPE_MARKER) {
                Some((label, component)) => Self::Info {
                    label: unescape_body(label),
                    type_info: Some(TypeInfo::from_component(component)?),
                },
                None => Self::Info {
                    label: unescape_body(body),
                    type_info: None,
                },
            },
        })
    }
}

fn tagged(kind: MessageKind, body: &str) -> String {
    format!("{kind}{KIND_SEPARATOR}{}", escape_body(body))
}

/// Escape a message body so it cannot contain separators or newlines.
pub fn escape_body(text: &str) -> String {
    utf8_percent_encode(text, BODY_ESCAPE).to_string()
}

/// Reverse of [`escape_body`]; invalid sequences are kept as-is.
pub fn unescape_body(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

/// Encode messages into one attribute-ready string.
pub fn encode<'a, I>(messages: I) -> String
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .map(Message::encode)
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

/// Decode a payload string.
///
/// Never fails: a segment that cannot be interpreted becomes
/// [`Message::Plain`] holding the raw segment, so one bad segment does not
/// hide the rest.
pub fn decode(encoded: &str) -> Vec<Message> {
    encoded
        .split(SEGMENT_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            Message::decode_segment(segment).unwrap_or_else(|err| {
                tracing::debug!("Rendering undecodable tooltip segment as text: {err}");
                Message::Plain(segment.to_string())
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn foo_info() -> TypeInfo {
        TypeInfo {
            kind: "interface".into(),
            color: TypeColor::new("#2563eb", "#dbeafe"),
            description: "Example".into(),
        }
    }

    #[test]
    fn test_info_segment_shape() {
        // Given: An info message with a type record
        let message = Message::type_info(foo_info());

        // When: Encoding it
        let encoded = message.encode();

        // Then: It follows `info:::<type>\ntype:<encoded JSON>`
        assert!(encoded.starts_with("info:::interface\ntype:%7B"));
        assert!(!encoded.contains('"'));
        assert!(encoded.is_ascii());
    }

    #[test]
    fn test_body_escaping_protects_separators() {
        let message = Message::Error("a ||| b\nc ::: d 100%".into());

        let encoded = encode([&message]);

        assert!(!encoded[KIND_SEPARATOR.len() + 5..].contains('|'));
        assert!(!encoded.contains('\n'));
        assert_eq!(decode(&encoded), vec![message]);
    }

    #[test]
    fn test_spaces_and_quotes_stay_readable() {
        let encoded = encode([&Message::Error("Cannot find name 'bar'".into())]);

        assert_eq!(encoded, "error:::Cannot find name 'bar'");
    }

    #[test]
    fn test_decode_multiple_segments() {
        let messages = vec![
            Message::Error("Cannot find name 'bar'".into()),
            Message::Warning("unused".into()),
            Message::type_info(foo_info()),
            Message::Success("ok".into()),
        ];

        let decoded = decode(&encode(&messages));

        assert_eq!(decoded, messages);
    }

    #[test]
    fn test_unknown_kind_becomes_plain() {
        let decoded = decode("note:::hello|||info:::ok");

        assert_eq!(decoded[0], Message::Plain("note:::hello".into()));
        assert_eq!(
            decoded[1],
            Message::Info {
                label: "ok".into(),
                type_info: None
            }
        );
    }

    #[test]
    fn test_malformed_type_record_becomes_plain() {
        // Given: A type segment whose JSON is truncated
        let raw = "info:::interface\ntype:%7B%22type%22";

        // When: Decoding alongside a healthy segment
        let decoded = decode(&format!("{raw}|||error:::boom"));

        // Then: The bad segment is kept verbatim and the other survives
        assert_eq!(decoded[0], Message::Plain(raw.into()));
        assert_eq!(decoded[1], Message::Error("boom".into()));
    }

    #[test]
    fn test_missing_separator_is_error() {
        assert_eq!(
            Message::decode_segment("no separator"),
            Err(WireError::MissingKind)
        );
    }

    #[test]
    fn test_fallback_record() {
        let info = TypeInfo::fallback("Foo");
        assert_eq!(info.kind, "Foo");
        assert_eq!(info.color, TypeColor::default_gray());
        assert_eq!(info.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_type_record_json_field_names() {
        let json = serde_json::to_value(foo_info()).unwrap();
        assert_eq!(json["type"], "interface");
        assert_eq!(json["color"]["background"], "#dbeafe");
    }

    proptest! {
        #[test]
        fn test_error_bodies_survive_encoding(text in r"\PC{0,80}") {
            let message = Message::Error(text);
            let encoded = encode([&message]);
            prop_assert!(encoded.is_ascii());
            prop_assert_eq!(decode(&encoded), vec![message]);
        }
    }
}
