use hoverdoc_core::RuntimeConfig;
use serde::{Deserialize, Serialize};

/// Runtime behaviour knobs.
///
/// Usually built from the `[runtime]` section of `hoverdoc.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Gap between a trigger's top edge and its tooltip.
    pub offset_px: f64,
    /// Minimum distance between the tooltip anchor and the viewport edges.
    pub viewport_margin_px: f64,
    /// Start in pinned mode.
    pub pinned: bool,
    /// Delay before a hover tooltip closes after the pointer leaves.
    pub hide_delay_ms: u32,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::from(&RuntimeConfig::default())
    }
}

impl From<&RuntimeConfig> for RuntimeOptions {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            offset_px: config.offset_px,
            viewport_margin_px: config.viewport_margin_px,
            pinned: config.pinned,
            hide_delay_ms: config.hide_delay_ms,
        }
    }
}
