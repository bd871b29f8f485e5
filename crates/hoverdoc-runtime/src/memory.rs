//! In-memory [`Dom`] for headless use: snapshot tests, server-side previews
//! and this crate's own tests.
//!
//! Nodes live in an arena and are never freed; [`Dom::remove`] only
//! detaches. Layout is whatever the caller assigns with
//! [`MemoryDom::set_rect`], timers only fire when the caller says so.
//!
//! ```rust
//! use hoverdoc_runtime::{Dom, MemoryDom, Rect};
//!
//! let mut dom = MemoryDom::new(1024.0, 768.0);
//! let body = dom.body();
//! let span = dom.create_element("span");
//! dom.add_class(&span, "tooltip-trigger");
//! dom.append_child(&body, &span);
//! dom.set_rect(&span, Rect::new(100.0, 200.0, 40.0, 16.0));
//!
//! assert!(dom.contains(&body, &span));
//! assert_eq!(dom.find_by_class("tooltip-trigger"), vec![span]);
//! ```

use crate::dom::{Dom, EventKind, Rect, TimerId, Viewport};
use std::collections::{BTreeMap, BTreeSet};

/// Arena index of a [`MemoryDom`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct NodeData {
    tag: String,
    text: Option<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
}

/// Arena-backed document.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    viewport: Viewport,
    next_timer: u64,
    timers: BTreeMap<TimerId, u32>,
    listeners: Vec<EventKind>,
}

const BODY: NodeId = NodeId(0);

impl MemoryDom {
    /// Empty document with a `<body>` and the given viewport size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            nodes: vec![NodeData {
                tag: "body".into(),
                ..NodeData::default()
            }],
            viewport: Viewport::new(width, height),
            next_timer: 1,
            timers: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    /// Assign the box [`Dom::bounding_rect`] reports for `node`.
    pub fn set_rect(&mut self, node: &NodeId, rect: Rect) {
        self.node_mut(*node).rect = rect;
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    /// Tag name, or `#text` for text nodes.
    pub fn tag(&self, node: &NodeId) -> &str {
        let data = self.node(*node);
        if data.text.is_some() { "#text" } else { &data.tag }
    }

    /// Child nodes in order.
    pub fn children(&self, node: &NodeId) -> &[NodeId] {
        &self.node(*node).children
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: &NodeId) -> String {
        let data = self.node(*node);
        if let Some(text) = &data.text {
            return text.clone();
        }
        data.children
            .iter()
            .map(|child| self.text_content(child))
            .collect()
    }

    /// Inline style property, if set.
    pub fn style(&self, node: &NodeId, property: &str) -> Option<&str> {
        self.node(*node).style.get(property).map(String::as_str)
    }

    /// Whether `node` is attached under `<body>`.
    pub fn is_attached(&self, node: &NodeId) -> bool {
        self.contains(&BODY, node)
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![BODY];
        while let Some(id) = stack.pop() {
            if self.has_class(&id, class) {
                found.push(id);
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        found
    }

    /// First attached descendant of `node` (or `node` itself) with `class`.
    pub fn descendant_with_class(&self, node: &NodeId, class: &str) -> Option<NodeId> {
        let mut stack = vec![*node];
        while let Some(id) = stack.pop() {
            if self.has_class(&id, class) {
                return Some(id);
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        None
    }

    /// Document listeners installed so far.
    pub fn listeners(&self) -> &[EventKind] {
        &self.listeners
    }

    /// Timers set and not yet cleared, with their delays.
    pub fn pending_timers(&self) -> Vec<(TimerId, u32)> {
        self.timers.iter().map(|(id, delay)| (*id, *delay)).collect()
    }

    /// Mark a timer as fired, returning whether it was still pending. The
    /// caller then delivers the matching timer event.
    pub fn fire_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Class list of `node`.
    pub fn classes(&self, node: &NodeId) -> BTreeSet<&str> {
        self.node(*node)
            .attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        BODY
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData {
            text: Some(text.to_string()),
            ..NodeData::default()
        })
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.remove(child);
        self.node_mut(*child).parent = Some(*parent);
        self.node_mut(*parent).children.push(*child);
    }

    fn remove(&mut self, node: &NodeId) {
        if let Some(parent) = self.node_mut(*node).parent.take() {
            self.node_mut(parent).children.retain(|c| c != node);
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).parent
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.node_mut(*node)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.node(*node).attributes.get(name).cloned()
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let attributes = &mut self.node_mut(*node).attributes;
        let classes = attributes.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.node(*node)
            .attributes
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        self.node_mut(*node)
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        self.node(*node).rect
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(id, delay_ms);
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    fn add_document_listener(&mut self, kind: EventKind) {
        self.listeners.push(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_moves_node() {
        let mut dom = MemoryDom::new(800.0, 600.0);
        let a = dom.create_element("div");
        let b = dom.create_element("div");
        let child = dom.create_text("hi");
        let body = dom.body();
        dom.append_child(&body, &a);
        dom.append_child(&body, &b);

        dom.append_child(&a, &child);
        dom.append_child(&b, &child);

        assert!(dom.children(&a).is_empty());
        assert_eq!(dom.children(&b), &[child]);
        assert_eq!(dom.text_content(&b), "hi");
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut dom = MemoryDom::new(800.0, 600.0);
        let body = dom.body();
        let outer = dom.create_element("div");
        let inner = dom.create_element("span");
        dom.append_child(&body, &outer);
        dom.append_child(&outer, &inner);

        dom.remove(&outer);

        assert!(!dom.is_attached(&inner));
        assert!(dom.contains(&outer, &inner));
    }

    #[test]
    fn test_classes_are_not_duplicated() {
        let mut dom = MemoryDom::new(800.0, 600.0);
        let node = dom.create_element("div");

        dom.add_class(&node, "a");
        dom.add_class(&node, "b");
        dom.add_class(&node, "a");

        assert_eq!(dom.attribute(&node, "class").as_deref(), Some("a b"));
    }

    #[test]
    fn test_timers() {
        let mut dom = MemoryDom::new(800.0, 600.0);
        let first = dom.set_timeout(100);
        let second = dom.set_timeout(200);

        dom.clear_timeout(first);

        assert_eq!(dom.pending_timers(), vec![(second, 200)]);
        assert!(dom.fire_timer(second));
        assert!(!dom.fire_timer(second));
    }
}
