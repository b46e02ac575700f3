//! Heatmap aggregation result types.

use serde::{Deserialize, Serialize};

/// Hard cap on the number of points a windowed heatmap query returns.
pub const HEATMAP_POINT_LIMIT: usize = 500;

/// Issue type that keeps a session's clicks visible when the click-rage
/// augmentation is enabled.
pub const CLICK_RAGE_ISSUE_TYPE: &str = "click_rage";

/// One recorded click's position, normalized to [0, 1] relative to the
/// viewport/document. Only emitted when both coordinates were captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub normalized_x: f64,
    pub normalized_y: f64,
}

/// Clicked-element selector with its click count, ordered descending by
/// count. Tie order is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorFrequency {
    pub selector: String,
    pub count: i64,
}

/// Parameters of a windowed heatmap query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapQuery {
    /// Matched against either stored URL representation (host+path OR path).
    pub url: String,
    /// Epoch milliseconds, inclusive.
    pub start_ts: i64,
    /// Epoch milliseconds, inclusive.
    pub end_ts: i64,
    /// When true, restrict points to sessions that either have no recorded
    /// issue data or raised a click-rage issue inside the window.
    pub click_rage: bool,
}

impl HeatmapQuery {
    pub fn new(url: impl Into<String>, start_ts: i64, end_ts: i64) -> Self {
        Self {
            url: url.into(),
            start_ts,
            end_ts,
            click_rage: false,
        }
    }

    pub fn with_click_rage(mut self) -> Self {
        self.click_rage = true;
        self
    }
}
