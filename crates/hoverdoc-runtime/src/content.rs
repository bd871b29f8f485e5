//! Tooltip body construction.
//!
//! Content is assembled from element and text nodes, never from markup
//! strings, so payload text cannot inject HTML. Layout of one tooltip:
//!
//! ```text
//! div.hoverdoc-tooltip
//!   button.tooltip-close            (pinned mode only)
//!   div.tooltip-message.tooltip-error
//!     span.tooltip-icon             "✖"
//!     span.tooltip-text             "Cannot find name 'bar'"
//!   div.tooltip-message.tooltip-info
//!     span.tooltip-icon             "ℹ"
//!     span.tooltip-type             "interface"  (coloured chip)
//!     span.tooltip-text             "Example"
//! ```

use crate::dom::Dom;
use hoverdoc_core::wire::{self, Message, MessageKind, TypeInfo};

/// Class of the tooltip root element.
pub const TOOLTIP_CLASS: &str = "hoverdoc-tooltip";
/// Class of the close control on pinned tooltips.
pub const CLOSE_CLASS: &str = "tooltip-close";
/// Class added to a tooltip once it has been pinned.
pub const PINNED_CLASS: &str = "pinned";

/// Decode a `data-tooltip` value.
///
/// Segments that cannot be interpreted come back as [`Message::Plain`]; an
/// attribute that yields nothing at all is shown verbatim.
pub fn decode_payload(raw: &str) -> Vec<Message> {
    let messages = wire::decode(raw);
    if messages.is_empty() && !raw.trim().is_empty() {
        tracing::debug!("Tooltip payload decoded to nothing, showing it raw");
        return vec![Message::Plain(raw.to_string())];
    }
    messages
}

/// Icon glyph for a message kind.
pub const fn icon(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Error => "\u{2716}",
        MessageKind::Warning => "\u{26a0}",
        MessageKind::Info => "\u{2139}",
        MessageKind::Success => "\u{2714}",
    }
}

/// Build a detached tooltip element for `messages`.
pub fn render<D: Dom>(dom: &mut D, messages: &[Message], closable: bool) -> D::Node {
    let root = dom.create_element("div");
    dom.add_class(&root, TOOLTIP_CLASS);
    dom.set_attribute(&root, "role", "tooltip");

    if closable {
        add_close_control(dom, &root);
    }

    for message in messages {
        let row = render_message(dom, message);
        dom.append_child(&root, &row);
    }
    root
}

/// Append a close control to `tooltip`.
pub fn add_close_control<D: Dom>(dom: &mut D, tooltip: &D::Node) {
    let close = dom.create_element("button");
    dom.add_class(&close, CLOSE_CLASS);
    dom.set_attribute(&close, "type", "button");
    dom.set_attribute(&close, "aria-label", "Close");
    append_text(dom, &close, "\u{00d7}");
    dom.append_child(tooltip, &close);
}

fn render_message<D: Dom>(dom: &mut D, message: &Message) -> D::Node {
    let row = dom.create_element("div");
    dom.add_class(&row, "tooltip-message");

    let Some(kind) = message.kind() else {
        dom.add_class(&row, "tooltip-plain");
        if let Message::Plain(raw) = message {
            push_span(dom, &row, "tooltip-text", raw);
        }
        return row;
    };

    dom.add_class(&row, &format!("tooltip-{kind}"));
    push_span(dom, &row, "tooltip-icon", icon(kind));

    match message {
        Message::Error(text) | Message::Warning(text) | Message::Success(text) => {
            push_span(dom, &row, "tooltip-text", text);
        },
        Message::Info {
            type_info: Some(info),
            ..
        } => push_type_chip(dom, &row, info),
        Message::Info { label, .. } => {
            push_span(dom, &row, "tooltip-text", label);
        },
        Message::Plain(_) => {},
    }
    row
}

fn push_type_chip<D: Dom>(dom: &mut D, row: &D::Node, info: &TypeInfo) {
    let chip = push_span(dom, row, "tooltip-type", &info.kind);
    dom.set_style(&chip, "color", &info.color.text);
    dom.set_style(&chip, "background-color", &info.color.background);
    push_span(dom, row, "tooltip-text", &info.description);
}

fn push_span<D: Dom>(dom: &mut D, parent: &D::Node, class: &str, text: &str) -> D::Node {
    let span = dom.create_element("span");
    dom.add_class(&span, class);
    append_text(dom, &span, text);
    dom.append_child(parent, &span);
    span
}

fn append_text<D: Dom>(dom: &mut D, parent: &D::Node, text: &str) {
    let node = dom.create_text(text);
    dom.append_child(parent, &node);
}
