// Autoclick engine module
// This module provides the capture-match-click control loop that watches the
// screen for template images and clicks when the configured condition holds.

pub mod channels;
pub mod condition;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod region;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::create_clicker_channels;
pub use condition::{MatchCondition, should_click};
pub use engine::ClickEngine;
pub use error::{ClickerError, ClickerResult, ErrorKind};
pub use matcher::MATCH_THRESHOLD;
pub use region::SearchRegion;
pub use types::{ClickerCommand, ClickerEvent, ClickerState, ClickerStats, RunSession};
