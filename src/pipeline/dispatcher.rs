//! Event dispatcher: the single consumer of worker events.
//!
//! Runs on the eframe main thread.  Every frame the UI calls
//! [`Dispatcher::poll`]; when the [`Ticker`] is due, queued events are
//! drained and applied to the [`ViewState`] in arrival order.  Nothing here
//! blocks.
//!
//! The dispatcher also owns admission: [`Dispatcher::submit`] is the only
//! place the busy gate is set, and only `Progress(Stopped)` clears it.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::UiConfig;

use super::error::MODEL_NOT_READY;
use super::event::{EventReceiver, EventSender};
use super::generation::GenerationWorker;
use super::request::GenerationRequest;
use super::state::{ModelState, Notice, TaskState, ViewState};

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Fixed-cadence timer driven by the caller's clock.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `true` at most once per interval.  The first call is always due.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SubmitError
// ---------------------------------------------------------------------------

/// Why a generation request was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{}", MODEL_NOT_READY)]
    ModelNotReady,

    #[error("a generation is already running")]
    Busy,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    events: EventReceiver,
    sender: EventSender,
    state: ViewState,
    worker: GenerationWorker,
    runtime: Handle,
    ticker: Ticker,
    max_events_per_tick: usize,
}

impl Dispatcher {
    /// `sender` must feed `events`; it is handed to every admitted task.
    pub fn new(
        events: EventReceiver,
        sender: EventSender,
        worker: GenerationWorker,
        runtime: Handle,
        ui: &UiConfig,
    ) -> Self {
        Self {
            events,
            sender,
            state: ViewState::default(),
            worker,
            runtime,
            ticker: Ticker::new(Duration::from_millis(ui.tick_interval_ms)),
            max_events_per_tick: ui.max_events_per_tick.max(1),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Take the pending dialog, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.state.notice.take()
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Tick if the cadence says so.  Returns the number of events applied.
    pub fn poll(&mut self, now: Instant) -> usize {
        if self.ticker.due(now) {
            self.tick()
        } else {
            0
        }
    }

    /// Drain and apply queued events, at most `max_events_per_tick` of them.
    ///
    /// An empty queue is a no-op returning `0`.
    pub fn tick(&mut self) -> usize {
        let mut applied = 0;
        while applied < self.max_events_per_tick {
            let Some(event) = self.events.try_recv() else {
                break;
            };
            log::trace!("dispatch: {event:?}");
            self.state.apply(event);
            applied += 1;
        }
        applied
    }

    /// Admit `request` and start its generation task.
    ///
    /// Rejected requests leave the gate untouched and surface as an error
    /// notice.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<JoinHandle<()>, SubmitError> {
        let verdict = match (&self.state.model, self.state.task) {
            (ModelState::Ready, TaskState::Idle) => Ok(()),
            (ModelState::Ready, TaskState::Busy) => Err(SubmitError::Busy),
            (ModelState::Loading | ModelState::Failed(_), _) => Err(SubmitError::ModelNotReady),
        };
        if let Err(err) = verdict {
            log::warn!("dispatch: rejected {:?}: {err}", request.prompt());
            self.state.notice = Some(Notice::Error(err.to_string()));
            return Err(err);
        }

        log::info!(
            "dispatch: accepted {:?} ({} s) -> {}",
            request.prompt(),
            request.duration_secs(),
            request.output().display()
        );
        self.state.task = TaskState::Busy;
        self.state.spinning = true;
        Ok(self.worker.spawn(&self.runtime, self.sender.clone(), request))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
