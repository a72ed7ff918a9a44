//! Synthetic mouse output and the optional click log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings as EnigoSettings};

use crate::autoclick::error::{ClickerError, ClickerResult};

/// Sink for synthetic clicks. Trait seam so tests can record clicks instead
/// of moving the real cursor.
pub trait MouseClicker {
    /// Left-click at absolute screen coordinates.
    fn click(&mut self, x: i32, y: i32) -> ClickerResult<()>;
}

/// Production clicker backed by the `enigo` crate.
pub struct EnigoClicker {
    enigo: Enigo,
}

impl EnigoClicker {
    pub fn new() -> ClickerResult<Self> {
        let enigo = Enigo::new(&EnigoSettings::default()).map_err(|e| ClickerError::MouseInit {
            description: e.to_string(),
        })?;
        Ok(Self { enigo })
    }
}

impl MouseClicker for EnigoClicker {
    fn click(&mut self, x: i32, y: i32) -> ClickerResult<()> {
        let click_err = |description: String| ClickerError::ClickFailed { x, y, description };
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| click_err(e.to_string()))?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| click_err(e.to_string()))
    }
}

/// Append-only click log: one `[timestamp] click at (x, y)` line per click.
/// Write failures are logged and never interrupt the loop.
#[derive(Debug, Clone)]
pub struct ClickLog {
    path: PathBuf,
}

impl ClickLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn record(&self, x: i32, y: i32) {
        let line = format!(
            "[{}] click at ({}, {})\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            x,
            y
        );
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            log::warn!("failed to append click log {:?}: {e}", self.path);
        }
    }
}
