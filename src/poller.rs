use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::debug_flags::{self, DEBUG_POLL};
use crate::error::{NotReady, PollError};
use crate::history::{RollingSeriesBuffer, SeriesSnapshot};
use crate::http_client::DeviceApi;
use crate::render::Renderer;
use crate::telemetry::{DeviceStatus, Sample};

// ── PollState ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollState::Idle => write!(f, "IDLE"),
            PollState::Fetching => write!(f, "FETCHING"),
        }
    }
}

/// How one tick ended. The poller is back in [`PollState::Idle`] for all of them.
#[derive(Debug)]
pub enum PollOutcome {
    Applied,
    Failed(PollError),
    /// A fetch was already in flight; the tick was dropped, not queued.
    Skipped,
}

/// Puts the poller back to idle however the fetch future ends.
struct FetchGuard<'a>(&'a Cell<PollState>);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(PollState::Idle);
    }
}

// ── Poller ──────────────────────────────────────────────────────────

/// Fetch → decode → append → render, once per tick, never overlapping.
///
/// The history buffer is written only from here. A failed poll leaves the
/// buffer and the last status untouched.
pub struct TelemetryPoller<A, R, const N: usize> {
    api: Rc<A>,
    renderer: Rc<R>,
    history: RefCell<RollingSeriesBuffer<N>>,
    latest: RefCell<Option<DeviceStatus>>,
    state: Cell<PollState>,
    period: Duration,
}

impl<A, R, const N: usize> TelemetryPoller<A, R, N>
where
    A: DeviceApi + 'static,
    R: Renderer + 'static,
{
    pub fn new(api: Rc<A>, renderer: Rc<R>, period: Duration) -> Self {
        Self {
            api,
            renderer,
            history: RefCell::new(RollingSeriesBuffer::new()),
            latest: RefCell::new(None),
            state: Cell::new(PollState::Idle),
            period,
        }
    }

    pub fn state(&self) -> PollState {
        self.state.get()
    }

    pub fn latest_status(&self) -> Option<DeviceStatus> {
        self.latest.borrow().clone()
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        self.history.borrow().snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    pub const fn history_capacity(&self) -> usize {
        N
    }

    /// Check the renderer once, then spawn [`run`](Self::run) as a local task.
    /// Nothing is fetched or drawn against a renderer that is not ready.
    pub fn start(self: Rc<Self>) -> Result<JoinHandle<()>, NotReady> {
        if !self.renderer.ready() {
            warn!("Renderer not ready, poll loop not started");
            return Err(NotReady);
        }
        Ok(tokio::task::spawn_local(self.run()))
    }

    /// Tick forever: once immediately, then every period. Each tick runs as its
    /// own local task so a slow fetch never delays the timer; ticks that land
    /// mid-fetch are skipped by [`poll_once`](Self::poll_once).
    ///
    /// Must run inside a `LocalSet`.
    pub async fn run(self: Rc<Self>) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Polling every {} ms", self.period.as_millis());

        loop {
            ticker.tick().await;
            let poller = Rc::clone(&self);
            tokio::task::spawn_local(async move {
                poller.poll_once().await;
            });
        }
    }

    pub async fn poll_once(&self) -> PollOutcome {
        if self.state.get() == PollState::Fetching {
            debug!("Poll tick skipped: fetch still in flight");
            return PollOutcome::Skipped;
        }

        self.state.set(PollState::Fetching);
        let guard = FetchGuard(&self.state);
        let result = self.fetch_status().await;
        drop(guard);

        match result {
            Ok(status) => {
                self.apply(status, Local::now());
                PollOutcome::Applied
            }
            Err(e) => {
                warn!("Status poll failed: {}", e);
                PollOutcome::Failed(e)
            }
        }
    }

    async fn fetch_status(&self) -> Result<DeviceStatus, PollError> {
        let body = self.api.fetch_status().await?;
        DeviceStatus::decode(&body)
    }

    fn apply(&self, status: DeviceStatus, at: DateTime<Local>) {
        let sample = Sample::from_status(&status, at);
        self.history.borrow_mut().append(&sample);

        let line = format!(
            "Poll: air {:.1}C / {:.0}%, soil {:.0}/{:.0}/{:.0}, mode {}",
            status.air_temp, status.air_hum, status.soil[0], status.soil[1], status.soil[2], status.mode
        );
        if debug_flags::is_on(&DEBUG_POLL) {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }

        let snapshot = self.history.borrow().snapshot();
        *self.latest.borrow_mut() = Some(status.clone());

        self.renderer.refresh_charts(&snapshot);
        self.renderer.refresh_status_cards(&status);
    }

    /// Re-render the last applied state without fetching.
    pub fn rerender(&self) -> bool {
        let Some(status) = self.latest_status() else {
            return false;
        };
        self.renderer.refresh_charts(&self.snapshot());
        self.renderer.refresh_status_cards(&status);
        true
    }
}
