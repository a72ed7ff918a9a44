//! Flat JSON settings record.
//!
//! The file is merged with defaults on load so records written by older
//! versions (or hand-edited ones with missing keys) keep working. A broken
//! file is logged and replaced by defaults rather than failing startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::autoclick::condition::MatchCondition;
use crate::autoclick::error::{ClickerError, ClickerResult};
use crate::autoclick::region::SearchRegion;
use crate::autoclick::types::RunSession;

/// Ordered list of template image paths. Order matters only in sequence
/// mode; `reorder` is what a drag-and-drop list reduces to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSet(Vec<String>);

impl ImageSet {
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn add(&mut self, path: impl Into<String>) {
        self.0.push(path.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    /// Move the entry at `from` so it ends up at position `to`. Out-of-range
    /// indices are ignored.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from < self.0.len() && to < self.0.len() && from != to {
            let path = self.0.remove(from);
            self.0.insert(to, path);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for ImageSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds to wait after a click burst before the next scan.
    pub delay_after_disappearance: f64,
    pub clicks_per_cycle: u32,
    /// Seconds between the clicks of one burst.
    pub delay_between_clicks: f64,
    pub sequence_mode: bool,
    pub image_paths: ImageSet,
    pub click_conditions: MatchCondition,
    pub search_area: Option<SearchRegion>,
    pub log_clicks: bool,
    pub click_log_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay_after_disappearance: 0.1,
            clicks_per_cycle: 1,
            delay_between_clicks: 0.2,
            sequence_mode: false,
            image_paths: ImageSet::default(),
            click_conditions: MatchCondition::default(),
            search_area: None,
            log_clicks: true,
            click_log_path: "click_log.txt".to_string(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or
    /// broken. Never fails; a broken file is only logged.
    pub fn load(path: &Path) -> Settings {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}; using defaults");
                Settings::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> ClickerResult<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ClickerError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_json::from_str(&raw).map_err(|source| ClickerError::SettingsParse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> ClickerResult<()> {
        let write_err = |source| ClickerError::SettingsWrite {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        std::fs::write(path, json).map_err(write_err)
    }

    /// Clamp hand-edited values back into range. Applied on load, before
    /// anything reads the record.
    fn normalize(&mut self) {
        self.click_conditions.normalize();
        if self.clicks_per_cycle == 0 {
            self.clicks_per_cycle = 1;
        }
        if !self.delay_after_disappearance.is_finite() || self.delay_after_disappearance < 0.0 {
            self.delay_after_disappearance = 0.0;
        }
        if !self.delay_between_clicks.is_finite() || self.delay_between_clicks < 0.0 {
            self.delay_between_clicks = 0.0;
        }
    }

    /// Snapshot the record into the immutable per-run session the worker
    /// owns for the duration of a start.
    pub fn session(&self) -> RunSession {
        RunSession {
            images: self.image_paths.paths().iter().map(PathBuf::from).collect(),
            condition: self.click_conditions.clone(),
            region: self.search_area.clone(),
            sequence_mode: self.sequence_mode,
            clicks_per_cycle: self.clicks_per_cycle,
            click_delay: Duration::from_secs_f64(self.delay_between_clicks),
            rescan_delay: Duration::from_secs_f64(self.delay_after_disappearance),
            click_log: self
                .log_clicks
                .then(|| PathBuf::from(&self.click_log_path)),
        }
    }
}
