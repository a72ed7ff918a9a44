//! Click condition evaluation.
//!
//! The one real decision in every iteration: given how many match points the
//! scan produced, does the loop click this cycle?

use serde::{Deserialize, Serialize};

/// User-configured click condition, persisted inside the settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCondition {
    /// Minimum number of match points required across all searched images.
    #[serde(default = "default_min_images")]
    pub min_images: u32,
    /// Invert the condition: click only when nothing was found.
    #[serde(default)]
    pub click_if_not_found: bool,
    /// Stop the loop once this many clicks were issued. 0 means unlimited.
    #[serde(default)]
    pub max_clicks: u64,
}

fn default_min_images() -> u32 {
    1
}

impl Default for MatchCondition {
    fn default() -> Self {
        Self {
            min_images: 1,
            click_if_not_found: false,
            max_clicks: 0,
        }
    }
}

impl MatchCondition {
    /// Build a condition from raw user input, clamping at apply time:
    /// `min_images` to at least 1, `max_clicks` to at least 0.
    pub fn new(min_images: i64, click_if_not_found: bool, max_clicks: i64) -> Self {
        Self {
            min_images: min_images.max(1) as u32,
            click_if_not_found,
            max_clicks: max_clicks.max(0) as u64,
        }
    }

    /// Re-apply the clamps after deserializing a hand-edited settings file.
    pub fn normalize(&mut self) {
        if self.min_images == 0 {
            self.min_images = 1;
        }
    }

    pub fn max_clicks_reached(&self, total_clicks: u64) -> bool {
        self.max_clicks > 0 && total_clicks >= self.max_clicks
    }
}

/// Decide whether this iteration clicks. Pure function of the match count
/// and the active condition; clamping happened at configuration-apply time.
pub fn should_click(found_count: usize, condition: &MatchCondition) -> bool {
    if condition.click_if_not_found {
        found_count == 0
    } else {
        found_count >= condition.min_images as usize
    }
}
