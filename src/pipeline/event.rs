//! Worker → dispatcher events and the channel that carries them.
//!
//! Any number of workers hold an [`EventSender`]; the dispatcher owns the
//! single [`EventReceiver`].  The channel is unbounded so a send never
//! blocks a worker, and events from one sender arrive in send order.

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Phase of a running generation task, shown in the status label.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    /// The prompt is being translated.
    Translating,
    /// The model is generating audio for the translated `prompt`.
    Generating { prompt: String },
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Translating => write!(f, "translating"),
            TaskStatus::Generating { prompt } => write!(f, "generating ({prompt})"),
        }
    }
}

/// Progress indicator transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Started,
    /// Always the last event of a generation task; releases the busy gate.
    Stopped,
}

/// Everything a worker can report.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Splash-screen text while the model loads.
    ModelStatus(String),
    /// The model has been published and generation may be admitted.
    ModelReady,
    /// Generation task phase change.
    Status(TaskStatus),
    Progress(Progress),
    /// A clip was saved at this path.
    Done(PathBuf),
    /// Human-readable failure from any stage.
    Error(String),
}

impl Event {
    /// `true` for the events that end a task (`ModelReady`, `Done`, `Error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::ModelReady | Event::Done(_) | Event::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Producer half.  Cheap to clone; hand one to every worker.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Enqueue `event` without blocking.
    ///
    /// After the dispatcher is gone (shutdown) the event is dropped and
    /// logged at debug level.
    pub fn send(&self, event: Event) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            log::debug!("event channel closed, dropping {event:?}");
        }
    }
}

/// Consumer half, owned by the dispatcher.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReceiver {
    /// Take the next queued event without blocking.
    ///
    /// Returns `None` when the queue is empty, including after every sender
    /// has been dropped.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_channel_yields_none_repeatedly() {
        let (_tx, mut rx) = event_channel();
        for _ in 0..3 {
            assert_eq!(rx.try_recv(), None);
        }
    }

    #[test]
    fn single_producer_is_fifo() {
        let (tx, mut rx) = event_channel();
        tx.send(Event::Status(TaskStatus::Translating));
        tx.send(Event::Done("a.wav".into()));
        tx.send(Event::Progress(Progress::Stopped));

        assert_eq!(rx.try_recv(), Some(Event::Status(TaskStatus::Translating)));
        assert_eq!(rx.try_recv(), Some(Event::Done("a.wav".into())));
        assert_eq!(rx.try_recv(), Some(Event::Progress(Progress::Stopped)));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn disconnected_channel_still_drains_then_reads_empty() {
        let (tx, mut rx) = event_channel();
        tx.send(Event::ModelReady);
        drop(tx);
        assert_eq!(rx.try_recv(), Some(Event::ModelReady));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn send_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = event_channel();
        drop(rx);
        tx.send(Event::Error("late".into()));
    }

    #[test]
    fn terminal_classification() {
        assert!(Event::ModelReady.is_terminal());
        assert!(Event::Done("x.wav".into()).is_terminal());
        assert!(Event::Error("x".into()).is_terminal());
        assert!(!Event::Progress(Progress::Stopped).is_terminal());
        assert!(!Event::Status(TaskStatus::Translating).is_terminal());
        assert!(!Event::ModelStatus("loading".into()).is_terminal());
    }

    #[test]
    fn status_display() {
        assert_eq!(TaskStatus::Translating.to_string(), "translating");
        assert_eq!(
            TaskStatus::Generating {
                prompt: "quiet night".into()
            }
            .to_string(),
            "generating (quiet night)"
        );
    }
}
