//! The capture-match-click control loop.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use super::condition;
use super::error::{ClickerError, ClickerResult};
use super::matcher::{self, MATCH_THRESHOLD};
use super::region;
use super::types::{ClickerCommand, ClickerEvent, ClickerState, ClickerStats, RunSession};
use crate::capture::{MonitorInfo, ScreenGrabber, ScreenRect, primary_monitor};
use crate::click::{ClickLog, MouseClicker};

/// Backoff between scans when nothing qualified for a click.
const SCAN_BACKOFF: Duration = Duration::from_millis(100);
/// Poll interval for commands while stopped.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Worker-side state for one run.
struct ActiveSession {
    config: RunSession,
    /// Next image to search in sequence mode. May run one past the end;
    /// selection wraps it back to 0.
    cursor: usize,
    click_log: Option<ClickLog>,
}

/// The click loop worker. Owns the capture and mouse backends, consumes
/// commands and emits events; meant to be driven by [`run`](Self::run) on a
/// dedicated task while the shell keeps the sender halves.
pub struct ClickEngine<G, C> {
    grabber: G,
    clicker: C,
    state: ClickerState,
    command_rx: mpsc::Receiver<ClickerCommand>,
    event_tx: mpsc::Sender<ClickerEvent>,
    stats: Arc<ClickerStats>,
    session: Option<ActiveSession>,
    should_exit: bool,
}

impl<G: ScreenGrabber, C: MouseClicker> ClickEngine<G, C> {
    pub fn new(
        grabber: G,
        clicker: C,
        command_rx: mpsc::Receiver<ClickerCommand>,
        event_tx: mpsc::Sender<ClickerEvent>,
        stats: Arc<ClickerStats>,
    ) -> Self {
        Self {
            grabber,
            clicker,
            state: ClickerState::Stopped,
            command_rx,
            event_tx,
            stats,
            session: None,
            should_exit: false,
        }
    }

    pub fn state(&self) -> ClickerState {
        self.state
    }

    pub fn stats(&self) -> &Arc<ClickerStats> {
        &self.stats
    }

    /// Drive the loop until a `Shutdown` command arrives.
    pub async fn run(&mut self) {
        log::debug!("click engine loop started");
        loop {
            while let Ok(command) = self.command_rx.try_recv() {
                self.process_command(command).await;
            }
            if self.should_exit {
                break;
            }

            match self.state {
                ClickerState::Stopped => sleep(IDLE_POLL).await,
                ClickerState::Running => {
                    // The shell may clear the flag directly instead of
                    // sending a Stop command.
                    if !self.stats.is_running() {
                        self.stop().await;
                    } else {
                        self.run_iteration().await;
                    }
                }
            }
        }
        log::debug!("click engine loop ended");
    }

    async fn process_command(&mut self, command: ClickerCommand) {
        match command {
            ClickerCommand::Start(session) => {
                if self.state == ClickerState::Running {
                    log::debug!("already running, ignoring start");
                    return;
                }
                if let Err(e) = self.try_start(*session).await {
                    log::warn!("start refused: {e}");
                    let _ = self.event_tx.send(ClickerEvent::Error(e.to_string())).await;
                }
            }
            ClickerCommand::Stop => self.stop().await,
            ClickerCommand::Shutdown => {
                self.should_exit = true;
                self.stop().await;
                log::info!("click engine shutting down");
            }
        }
    }

    /// Validate the session and transition to `Running`. A refused start
    /// leaves the loop stopped with no session installed.
    pub(crate) async fn try_start(&mut self, config: RunSession) -> ClickerResult<()> {
        config.validate()?;
        let click_log = config.click_log.clone().map(ClickLog::new);
        log::info!(
            "starting click loop: {} image(s), sequence_mode={}, min_images={}, max_clicks={}",
            config.images.len(),
            config.sequence_mode,
            config.condition.min_images,
            config.condition.max_clicks
        );
        self.session = Some(ActiveSession {
            config,
            cursor: 0,
            click_log,
        });
        self.stats.reset_run();
        self.stats.set_running(true);
        self.change_state(ClickerState::Running).await;
        Ok(())
    }

    async fn stop(&mut self) {
        self.stats.set_running(false);
        self.session = None;
        self.change_state(ClickerState::Stopped).await;
    }

    async fn change_state(&mut self, new_state: ClickerState) {
        if self.state != new_state {
            log::debug!("click engine state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            let _ = self
                .event_tx
                .send(ClickerEvent::StateChanged(new_state))
                .await;
        }
    }

    /// One capture-match-evaluate-click cycle. Structural failures stop the
    /// loop; everything else at most skips a template or the click.
    pub(crate) async fn run_iteration(&mut self) {
        if let Err(e) = self.iteration_inner().await {
            log::error!("stopping click loop: {e}");
            let _ = self.event_tx.send(ClickerEvent::Error(e.to_string())).await;
            self.stop().await;
        }
    }

    async fn iteration_inner(&mut self) -> ClickerResult<()> {
        let (config, cursor) = match &self.session {
            Some(active) => (active.config.clone(), active.cursor),
            None => return Ok(()),
        };

        let monitors = self.grabber.monitors()?;
        let primary = *primary_monitor(&monitors).ok_or(ClickerError::NoMonitors)?;
        let (rect, monitor_index) =
            region::resolve_capture_rect(config.region.as_ref(), &monitors, &primary)?;
        let monitor = monitors[monitor_index];

        // Sequence mode searches exactly one image this iteration, wrapping
        // a cursor that ran past the end; otherwise every image is searched.
        let (selected, cursor) = if config.sequence_mode {
            let resolved = if cursor < config.images.len() { cursor } else { 0 };
            (vec![config.images[resolved].clone()], resolved)
        } else {
            (config.images.clone(), cursor)
        };

        let mut found: Vec<(i32, i32)> = Vec::new();
        for path in &selected {
            if !self.stats.is_running() {
                return Ok(());
            }
            match self.search_template(path, &monitor, &rect, &primary) {
                Ok(centers) => found.extend(centers),
                Err(e) => log::error!("skipping template this iteration: {e}"),
            }
        }

        let should_click = condition::should_click(found.len(), &config.condition);
        log::debug!(
            "scan: found={} min_images={} click_if_not_found={} should_click={}",
            found.len(),
            config.condition.min_images,
            config.condition.click_if_not_found,
            should_click
        );
        let _ = self
            .event_tx
            .send(ClickerEvent::ScanFinished {
                found: found.len(),
                should_click,
            })
            .await;

        if !should_click {
            sleep(SCAN_BACKOFF).await;
            return Ok(());
        }

        if config.condition.max_clicks_reached(self.stats.total_clicks()) {
            log::info!(
                "max clicks ({}) reached, stopping",
                config.condition.max_clicks
            );
            let _ = self
                .event_tx
                .send(ClickerEvent::MaxClicksReached(self.stats.total_clicks()))
                .await;
            self.stop().await;
            return Ok(());
        }

        let target = match found.first() {
            Some(&point) => point,
            None => {
                // Clicking because nothing was found: the only deterministic
                // target is the configured region's center. Without a region
                // the iteration is skipped.
                if config.region.is_none() {
                    log::warn!("nothing found and no search region configured, skipping click");
                    sleep(SCAN_BACKOFF).await;
                    return Ok(());
                }
                let (cx, cy) = rect.center();
                region::clamp_to_monitor(cx - primary.left, cy - primary.top, &primary)
            }
        };

        self.click_burst(target, &config).await;

        if config.sequence_mode
            && let Some(active) = self.session.as_mut()
        {
            active.cursor = cursor + 1;
            self.stats.set_cursor(active.cursor);
        }

        sleep(config.rescan_delay).await;
        Ok(())
    }

    /// Capture the rect and match one template against it. Any error here is
    /// per-template; the caller logs it and moves on.
    fn search_template(
        &mut self,
        path: &Path,
        monitor: &MonitorInfo,
        rect: &ScreenRect,
        primary: &MonitorInfo,
    ) -> ClickerResult<Vec<(i32, i32)>> {
        let template = matcher::load_template(path)?;
        let frame = self.grabber.grab(monitor, rect)?;
        matcher::ensure_fits(path, &template, &frame)?;
        let centers = matcher::find_centers(&frame, &template, MATCH_THRESHOLD);
        Ok(centers
            .into_iter()
            .map(|(x, y)| region::to_primary(x, y, rect, primary))
            .collect())
    }

    async fn click_burst(&mut self, (x, y): (i32, i32), config: &RunSession) {
        for _ in 0..config.clicks_per_cycle {
            // Stop requests take effect before the next click, not after
            // the whole burst.
            if !self.stats.is_running() {
                break;
            }
            if let Err(e) = self.clicker.click(x, y) {
                log::error!("{e}");
                let _ = self.event_tx.send(ClickerEvent::Error(e.to_string())).await;
                break;
            }
            let total_clicks = self.stats.record_click();
            log::info!("click at ({x}, {y}), total_clicks={total_clicks}");
            if let Some(click_log) = self.session.as_ref().and_then(|s| s.click_log.as_ref()) {
                click_log.record(x, y);
            }
            let _ = self
                .event_tx
                .send(ClickerEvent::Clicked { x, y, total_clicks })
                .await;
            sleep(config.click_delay).await;
        }
    }
}
