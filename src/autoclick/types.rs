//! Types shared between the click engine and whatever shell drives it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::condition::MatchCondition;
use super::error::{ClickerError, ClickerResult};
use super::region::SearchRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickerState {
    Stopped,
    Running,
}

/// Immutable per-run snapshot of everything the loop needs. Built by the
/// shell at start time; the worker owns it for the whole run, so the shell
/// can mutate its own settings freely while the loop is live.
#[derive(Debug, Clone)]
pub struct RunSession {
    /// Ordered template paths. Order matters only in sequence mode.
    pub images: Vec<PathBuf>,
    pub condition: MatchCondition,
    pub region: Option<SearchRegion>,
    /// Search one image per iteration, advancing through the list, instead
    /// of all images every iteration.
    pub sequence_mode: bool,
    pub clicks_per_cycle: u32,
    /// Delay between the clicks of one burst.
    pub click_delay: Duration,
    /// Delay after a click burst before the next scan.
    pub rescan_delay: Duration,
    /// Append a timestamped line per click when set.
    pub click_log: Option<PathBuf>,
}

impl RunSession {
    /// Start-time validation; a failure refuses the start and leaves the
    /// loop stopped.
    pub fn validate(&self) -> ClickerResult<()> {
        if self.images.is_empty() {
            return Err(ClickerError::NoImages);
        }
        if self.condition.min_images as usize > self.images.len() {
            return Err(ClickerError::NotEnoughImages {
                required: self.condition.min_images,
                loaded: self.images.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ClickerCommand {
    Start(Box<RunSession>),
    Stop,
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum ClickerEvent {
    StateChanged(ClickerState),
    /// One scan cycle finished; reports what the condition decided.
    ScanFinished { found: usize, should_click: bool },
    Clicked { x: i32, y: i32, total_clicks: u64 },
    MaxClicksReached(u64),
    Error(String),
}

/// Shared counters between the worker and the shell. The worker is the only
/// writer of the counters; the shell reads them for status text and may
/// clear the running flag to request a stop. The flag is checked at the top
/// of each iteration, before each template search and before each click.
#[derive(Debug, Default)]
pub struct ClickerStats {
    running: AtomicBool,
    total_clicks: AtomicU64,
    sequence_cursor: AtomicUsize,
}

impl ClickerStats {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request a stop from the shell side; observed within one inter-click
    /// delay at worst.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn total_clicks(&self) -> u64 {
        self.total_clicks.load(Ordering::SeqCst)
    }

    pub(crate) fn record_click(&self) -> u64 {
        self.total_clicks.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn sequence_cursor(&self) -> usize {
        self.sequence_cursor.load(Ordering::SeqCst)
    }

    pub(crate) fn set_cursor(&self, cursor: usize) {
        self.sequence_cursor.store(cursor, Ordering::SeqCst);
    }

    pub(crate) fn reset_run(&self) {
        self.total_clicks.store(0, Ordering::SeqCst);
        self.sequence_cursor.store(0, Ordering::SeqCst);
    }
}
