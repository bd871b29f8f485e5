//! Tooltip lifecycle.
//!
//! Each trigger moves through `idle -> showing -> (idle | pinned)`:
//!
//! - pointer enters a trigger: decode its payload, build the tooltip in the
//!   portal, register it (`showing`)
//! - pointer leaves: close it, or schedule a close after `hide_delay_ms`; in
//!   pinned mode mark it pinned instead
//! - a pinned tooltip closes through its close control, or when a click lands
//!   outside every pinned tooltip and trigger (which closes all of them)
//!
//! Outside pinned mode at most one tooltip is alive; showing a new one tears
//! down the previous. Every live tooltip is repositioned on scroll.

use crate::content::{self, CLOSE_CLASS, PINNED_CLASS};
use crate::dom::{Dom, EventKind, TimerId};
use crate::options::RuntimeOptions;
use crate::position::Anchor;
use hoverdoc_core::annotate::{PAYLOAD_ATTRIBUTE, TRIGGER_CLASS};
use hoverdoc_core::wire::Message;
use std::collections::HashMap;

/// Alternative trigger class accepted alongside `tooltip-trigger`.
pub const HAS_TOOLTIP_CLASS: &str = "has-tooltip";
/// Class of the portal container.
pub const PORTAL_CLASS: &str = "hoverdoc-portal";

const TRIGGER_CLASSES: &[&str] = &[TRIGGER_CLASS, HAS_TOOLTIP_CLASS];

/// Document event forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent<N> {
    /// `mouseover` on `target`.
    MouseOver(N),
    /// `mouseout` from `target` towards `related` (`relatedTarget`).
    MouseOut {
        /// Element the pointer left.
        target: N,
        /// Element the pointer entered, if any.
        related: Option<N>,
    },
    /// `click` on `target`.
    Click(N),
    /// `scroll` anywhere in the document.
    Scroll,
    /// A timer set through [`Dom::set_timeout`] fired.
    Timer(TimerId),
}

/// One live tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipInstance<N> {
    /// Tooltip root inside the portal.
    pub element: N,
    /// Element that opened it.
    pub trigger: N,
    /// Decoded payload.
    pub messages: Vec<Message>,
    /// Whether the pointer has left while pinned mode was on.
    pub pinned: bool,
    closable: bool,
    hide_timer: Option<TimerId>,
}

impl<N> TooltipInstance<N> {
    /// Pending debounced close, if any.
    pub const fn hide_timer(&self) -> Option<TimerId> {
        self.hide_timer
    }
}

/// Tooltip runtime for one page session.
///
/// Owns the document handle, the lazily created portal and the registry of
/// live tooltips keyed by trigger.
pub struct TooltipRuntime<D: Dom> {
    dom: D,
    options: RuntimeOptions,
    portal: Option<D::Node>,
    active: HashMap<D::Node, TooltipInstance<D::Node>>,
    order: Vec<D::Node>,
}

impl<D: Dom> TooltipRuntime<D> {
    /// Take over `dom` and install the document listeners.
    pub fn create(mut dom: D, options: RuntimeOptions) -> Self {
        for kind in EventKind::ALL {
            dom.add_document_listener(kind);
        }
        tracing::debug!("Tooltip runtime installed (pinned: {})", options.pinned);
        Self {
            dom,
            options,
            portal: None,
            active: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Document handle.
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable document handle, for hosts that also drive layout.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Release the document handle.
    pub fn into_dom(self) -> D {
        self.dom
    }

    /// Options in effect.
    pub const fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Portal container, once the first tooltip has been shown.
    pub const fn portal(&self) -> Option<&D::Node> {
        self.portal.as_ref()
    }

    /// Whether pinned mode is on.
    pub const fn is_pinned(&self) -> bool {
        self.options.pinned
    }

    /// Number of live tooltips.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Live tooltip opened by `trigger`.
    pub fn instance(&self, trigger: &D::Node) -> Option<&TooltipInstance<D::Node>> {
        self.active.get(trigger)
    }

    /// Live tooltips in the order they were shown.
    pub fn instances(&self) -> impl Iterator<Item = &TooltipInstance<D::Node>> {
        self.order.iter().filter_map(|trigger| self.active.get(trigger))
    }

    /// Dispatch one document event.
    pub fn handle(&mut self, event: RuntimeEvent<D::Node>) {
        match event {
            RuntimeEvent::MouseOver(target) => self.on_mouse_over(&target),
            RuntimeEvent::MouseOut { target, related } => {
                self.on_mouse_out(&target, related.as_ref());
            },
            RuntimeEvent::Click(target) => self.on_click(&target),
            RuntimeEvent::Scroll => self.reposition_all(),
            RuntimeEvent::Timer(id) => self.on_timer(id),
        }
    }

    /// Turn pinned mode on or off.
    ///
    /// Turning it on keeps every open tooltip: pending hides are cancelled
    /// and each gets a close control. Turning it off closes every pinned
    /// tooltip.
    pub fn set_pinned(&mut self, pinned: bool) {
        if self.options.pinned == pinned {
            return;
        }
        self.options.pinned = pinned;
        if pinned {
            for instance in self.active.values_mut() {
                if let Some(timer) = instance.hide_timer.take() {
                    self.dom.clear_timeout(timer);
                }
                if !instance.closable {
                    content::add_close_control(&mut self.dom, &instance.element);
                    instance.closable = true;
                }
            }
        } else {
            let pinned_triggers: Vec<D::Node> = self
                .instances()
                .filter(|instance| instance.pinned)
                .map(|instance| instance.trigger.clone())
                .collect();
            for trigger in pinned_triggers {
                self.hide(&trigger);
            }
        }
        tracing::debug!("Pinned mode {}", if pinned { "on" } else { "off" });
    }

    /// Show the tooltip for `trigger` unless it is already live.
    ///
    /// Returns `false` when the element carries no payload.
    pub fn show(&mut self, trigger: &D::Node) -> bool {
        if let Some(instance) = self.active.get_mut(trigger) {
            if let Some(timer) = instance.hide_timer.take() {
                self.dom.clear_timeout(timer);
            }
            return true;
        }

        let Some(raw) = self.dom.attribute(trigger, PAYLOAD_ATTRIBUTE) else {
            tracing::debug!("Trigger {trigger:?} has no {PAYLOAD_ATTRIBUTE} attribute");
            return false;
        };

        if !self.options.pinned {
            self.close_all();
        }

        let messages = content::decode_payload(&raw);
        let element = content::render(&mut self.dom, &messages, self.options.pinned);
        let portal = self.ensure_portal();
        self.dom.append_child(&portal, &element);

        Self::place(&mut self.dom, &self.options, trigger, &element);
        let instance = TooltipInstance {
            element,
            trigger: trigger.clone(),
            messages,
            pinned: false,
            closable: self.options.pinned,
            hide_timer: None,
        };
        self.active.insert(trigger.clone(), instance);
        self.order.push(trigger.clone());
        true
    }

    /// Close the tooltip for `trigger`, if live.
    pub fn hide(&mut self, trigger: &D::Node) {
        let Some(instance) = self.active.remove(trigger) else {
            return;
        };
        if let Some(timer) = instance.hide_timer {
            self.dom.clear_timeout(timer);
        }
        self.dom.remove(&instance.element);
        self.order.retain(|t| t != trigger);
    }

    /// Close every live tooltip.
    pub fn close_all(&mut self) {
        for trigger in std::mem::take(&mut self.order) {
            self.hide(&trigger);
        }
    }

    /// Recompute the position of every live tooltip.
    pub fn reposition_all(&mut self) {
        for trigger in &self.order {
            if let Some(instance) = self.active.get(trigger) {
                Self::place(&mut self.dom, &self.options, trigger, &instance.element);
            }
        }
    }

    fn place(dom: &mut D, options: &RuntimeOptions, trigger: &D::Node, element: &D::Node) {
        let anchor = Anchor::for_trigger(dom.bounding_rect(trigger), dom.viewport(), options);
        for (property, value) in anchor.styles() {
            dom.set_style(element, property, &value);
        }
    }

    fn ensure_portal(&mut self) -> D::Node {
        if let Some(portal) = &self.portal {
            return portal.clone();
        }
        let portal = self.dom.create_element("div");
        self.dom.add_class(&portal, PORTAL_CLASS);
        let body = self.dom.body();
        self.dom.append_child(&body, &portal);
        self.portal = Some(portal.clone());
        portal
    }

    fn trigger_for(&self, target: &D::Node) -> Option<D::Node> {
        self.dom.closest_with_class(target, TRIGGER_CLASSES)
    }

    fn on_mouse_over(&mut self, target: &D::Node) {
        if let Some(trigger) = self.trigger_for(target) {
            self.show(&trigger);
        }
    }

    fn on_mouse_out(&mut self, target: &D::Node, related: Option<&D::Node>) {
        let Some(trigger) = self.trigger_for(target) else {
            return;
        };
        if related.is_some_and(|r| self.dom.contains(&trigger, r)) {
            return;
        }
        let pinned_mode = self.options.pinned;
        let delay = self.options.hide_delay_ms;
        let Some(instance) = self.active.get_mut(&trigger) else {
            return;
        };

        if pinned_mode {
            if !instance.pinned {
                instance.pinned = true;
                self.dom.add_class(&instance.element, PINNED_CLASS);
            }
        } else if delay > 0 {
            if let Some(previous) = instance.hide_timer.take() {
                self.dom.clear_timeout(previous);
            }
            instance.hide_timer = Some(self.dom.set_timeout(delay));
        } else {
            self.hide(&trigger);
        }
    }

    fn on_timer(&mut self, id: TimerId) {
        let due = self
            .active
            .values()
            .find(|instance| instance.hide_timer == Some(id))
            .map(|instance| instance.trigger.clone());
        if let Some(trigger) = due {
            if let Some(instance) = self.active.get_mut(&trigger) {
                instance.hide_timer = None;
            }
            self.hide(&trigger);
        }
    }

    fn on_click(&mut self, target: &D::Node) {
        if let Some(close) = self.dom.closest_with_class(target, &[CLOSE_CLASS]) {
            let owner = self
                .active
                .values()
                .find(|instance| self.dom.contains(&instance.element, &close))
                .map(|instance| instance.trigger.clone());
            if let Some(trigger) = owner {
                self.hide(&trigger);
            }
            return;
        }

        if !self.options.pinned {
            return;
        }
        let inside = self.active.values().any(|instance| {
            self.dom.contains(&instance.element, target)
                || self.dom.contains(&instance.trigger, target)
        });
        if inside {
            return;
        }
        let pinned: Vec<D::Node> = self
            .instances()
            .filter(|instance| instance.pinned)
            .map(|instance| instance.trigger.clone())
            .collect();
        for trigger in pinned {
            self.hide(&trigger);
        }
    }
}

impl<D: Dom + std::fmt::Debug> std::fmt::Debug for TooltipRuntime<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipRuntime")
            .field("options", &self.options)
            .field("portal", &self.portal)
            .field("active", &self.order)
            .finish_non_exhaustive()
    }
}
