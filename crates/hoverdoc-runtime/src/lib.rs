//! # hoverdoc-runtime
//!
//! Interaction-time half of hoverdoc: shows, positions and manages the
//! tooltips for elements annotated by `hoverdoc-core`.
//!
//! The runtime is a state machine over an abstract [`Dom`]. A browser host
//! implements the trait on top of `web-sys`, installs the runtime with
//! [`TooltipRuntime::create`], and forwards document events as
//! [`RuntimeEvent`]s. [`MemoryDom`] is a complete in-memory implementation
//! for headless use.
//!
//! ```rust
//! use hoverdoc_runtime::{Dom, MemoryDom, Rect, RuntimeEvent, RuntimeOptions, TooltipRuntime};
//!
//! let mut dom = MemoryDom::new(1024.0, 768.0);
//! let body = dom.body();
//! let trigger = dom.create_element("span");
//! dom.add_class(&trigger, "tooltip-trigger");
//! dom.set_attribute(&trigger, "data-tooltip", "error:::Cannot%20find%20name%20'bar'");
//! dom.set_rect(&trigger, Rect::new(100.0, 200.0, 24.0, 16.0));
//! dom.append_child(&body, &trigger);
//!
//! let mut runtime = TooltipRuntime::create(dom, RuntimeOptions::default());
//! runtime.handle(RuntimeEvent::MouseOver(trigger));
//!
//! let tooltip = runtime.instance(&trigger).unwrap().element;
//! assert!(runtime.dom().text_content(&tooltip).contains("Cannot find name 'bar'"));
//! ```

/// Tooltip body construction
pub mod content;
/// DOM abstraction
pub mod dom;
/// In-memory DOM
pub mod memory;
mod options;
/// Tooltip placement
pub mod position;
/// Tooltip lifecycle state machine
pub mod runtime;

pub use dom::{Dom, EventKind, Rect, TimerId, Viewport};
pub use memory::{MemoryDom, NodeId};
pub use options::RuntimeOptions;
pub use position::Anchor;
pub use runtime::{RuntimeEvent, TooltipInstance, TooltipRuntime};
