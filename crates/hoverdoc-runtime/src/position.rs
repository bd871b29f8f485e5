//! Tooltip placement.
//!
//! Tooltips sit above their trigger: the portal child is `position: fixed`
//! with its `bottom` edge `offset` pixels above the trigger's top edge, and
//! `translateX(-50%)` centres it on `left`, the trigger's horizontal
//! midpoint. The midpoint is clamped into the viewport margins so a trigger
//! at the very edge of the page does not push its tooltip off screen.

use crate::dom::{Rect, Viewport};
use crate::options::RuntimeOptions;

/// Computed `bottom`/`left` for one tooltip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Distance from the viewport's bottom edge to the tooltip's bottom edge.
    pub bottom: f64,
    /// Horizontal centre of the tooltip.
    pub left: f64,
}

impl Anchor {
    /// Anchor for a trigger occupying `trigger`.
    pub fn for_trigger(trigger: Rect, viewport: Viewport, options: &RuntimeOptions) -> Self {
        let margin = options.viewport_margin_px.max(0.0);
        let max_left = (viewport.width - margin).max(margin);
        Self {
            bottom: viewport.height - trigger.top + options.offset_px,
            left: trigger.center_x().clamp(margin, max_left),
        }
    }

    /// Inline style declarations to apply to the tooltip element.
    pub fn styles(&self) -> [(&'static str, String); 4] {
        [
            ("position", "fixed".to_string()),
            ("bottom", px(self.bottom)),
            ("left", px(self.left)),
            ("transform", "translateX(-50%)".to_string()),
        ]
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}
