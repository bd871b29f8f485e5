//! The slice of the browser DOM the runtime needs.
//!
//! The runtime never touches a real document directly. A host (a
//! `wasm-bindgen` shim, a test harness, [`MemoryDom`](crate::MemoryDom))
//! implements [`Dom`] and forwards document events as
//! [`RuntimeEvent`](crate::RuntimeEvent)s.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Element bounding box in viewport coordinates, as `getBoundingClientRect`
/// reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the viewport's left edge.
    pub left: f64,
    /// Distance from the viewport's top edge.
    pub top: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl Rect {
    /// Create a rect.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Horizontal midpoint.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Visible viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// `innerWidth`.
    pub width: f64,
    /// `innerHeight`.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Document-level events the runtime listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// `mouseover`
    MouseOver,
    /// `mouseout`
    MouseOut,
    /// `click`
    Click,
    /// `scroll`
    Scroll,
}

impl EventKind {
    /// All kinds, in installation order.
    pub const ALL: [Self; 4] = [Self::MouseOver, Self::MouseOut, Self::Click, Self::Scroll];

    /// DOM event name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::Click => "click",
            Self::Scroll => "scroll",
        }
    }
}

/// Handle for a pending `setTimeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Document operations used by the runtime.
pub trait Dom {
    /// Node handle. Cheap to clone, compared by identity.
    type Node: Clone + Eq + Hash + Debug;

    /// `document.body`.
    fn body(&self) -> Self::Node;

    /// `document.createElement(tag)`.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// `document.createTextNode(text)`.
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// `parent.appendChild(child)`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// `node.remove()`.
    fn remove(&mut self, node: &Self::Node);

    /// `node.parentNode`.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// `node.setAttribute(name, value)`.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// `node.getAttribute(name)`.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// `node.classList.add(class)`.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// `node.classList.contains(class)`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// `node.style.setProperty(property, value)`.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// `node.getBoundingClientRect()`.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// `innerWidth` / `innerHeight`.
    fn viewport(&self) -> Viewport;

    /// `setTimeout`; the host delivers [`RuntimeEvent::Timer`](crate::RuntimeEvent::Timer)
    /// with the returned id when it fires.
    fn set_timeout(&mut self, delay_ms: u32) -> TimerId;

    /// `clearTimeout`.
    fn clear_timeout(&mut self, id: TimerId);

    /// `document.addEventListener(kind, ...)`.
    fn add_document_listener(&mut self, kind: EventKind);

    /// `ancestor.contains(node)`: true when `node` is `ancestor` or one of
    /// its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }

    /// `node.closest(...)` for any of `classes`.
    fn closest_with_class(&self, node: &Self::Node, classes: &[&str]) -> Option<Self::Node> {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if classes.iter().any(|class| self.has_class(&n, class)) {
                return Some(n);
            }
            current = self.parent(&n);
        }
        None
    }
}
