//! View state and the event transition table.
//!
//! [`ViewState`] is the single source of truth for everything the UI
//! renders.  Only the dispatcher mutates it, through [`ViewState::apply`]
//! (worker events) and its own admission bookkeeping.
//!
//! ```text
//! model:  Loading ──ModelReady──▶ Ready
//!         Loading ──Error───────▶ Failed
//!
//! task:   Idle ──submit accepted──▶ Busy ──Progress(Stopped)──▶ Idle
//! ```

use std::path::PathBuf;

use super::event::{Event, Progress};

/// Status label once the model is usable.
pub const READY_STATUS: &str = "ready";
/// Status label after any failed task.
pub const FAILED_STATUS: &str = "an error occurred";

// ---------------------------------------------------------------------------
// ModelState / TaskState
// ---------------------------------------------------------------------------

/// Where the one-shot model load stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelState {
    #[default]
    Loading,
    Ready,
    /// Load failed; generation stays disabled for the rest of the session.
    Failed(String),
}

/// The single-flight gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    /// A generation task was admitted and its `Progress(Stopped)` has not
    /// been applied yet.
    Busy,
}

/// A message the UI shows once in a dialog, then clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub model: ModelState,
    pub task: TaskState,

    /// Splash-screen text while the model loads.
    pub model_status: String,

    /// Main status label.
    pub status: String,

    /// Whether the progress spinner is shown.
    pub spinning: bool,

    /// Pending dialog, taken by the UI when shown.
    pub notice: Option<Notice>,

    /// Path of the most recently saved clip.
    pub last_output: Option<PathBuf>,
}

impl ViewState {
    /// `true` when a new generation may be admitted.
    ///
    /// ```
    /// use musicgen_desk::pipeline::{ModelState, ViewState};
    ///
    /// let mut view = ViewState::default();
    /// assert!(!view.can_submit());
    /// view.model = ModelState::Ready;
    /// assert!(view.can_submit());
    /// ```
    pub fn can_submit(&self) -> bool {
        self.model == ModelState::Ready && self.task == TaskState::Idle
    }

    pub fn is_busy(&self) -> bool {
        self.task == TaskState::Busy
    }

    /// Apply one worker event.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::ModelStatus(text) => {
                self.model_status = text;
            }
            Event::ModelReady => {
                self.model = ModelState::Ready;
                self.status = READY_STATUS.into();
            }
            Event::Status(status) => {
                self.status = status.to_string();
            }
            Event::Progress(Progress::Started) => {
                self.spinning = true;
            }
            Event::Progress(Progress::Stopped) => {
                self.spinning = false;
                self.task = TaskState::Idle;
            }
            Event::Done(path) => {
                self.status = format!("saved: {}", path.display());
                self.notice = Some(Notice::Info(format!(
                    "music was saved to {}",
                    path.display()
                )));
                self.last_output = Some(path);
            }
            Event::Error(message) if self.model == ModelState::Loading => {
                self.notice = Some(Notice::Error(message.clone()));
                self.model = ModelState::Failed(message);
            }
            Event::Error(message) => {
                self.status = FAILED_STATUS.into();
                self.notice = Some(Notice::Error(message));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::event::TaskStatus;

    fn ready() -> ViewState {
        ViewState {
            model: ModelState::Ready,
            ..ViewState::default()
        }
    }

    #[test]
    fn default_is_loading_and_idle() {
        let view = ViewState::default();
        assert_eq!(view.model, ModelState::Loading);
        assert_eq!(view.task, TaskState::Idle);
        assert!(!view.spinning);
        assert!(view.notice.is_none());
        assert!(!view.can_submit());
    }

    #[test]
    fn model_status_updates_splash_text() {
        let mut view = ViewState::default();
        view.apply(Event::ModelStatus("loading".into()));
        assert_eq!(view.model_status, "loading");
        assert_eq!(view.model, ModelState::Loading);
    }

    #[test]
    fn model_ready_enables_submission() {
        let mut view = ViewState::default();
        view.apply(Event::ModelReady);
        assert_eq!(view.model, ModelState::Ready);
        assert_eq!(view.status, "ready");
        assert!(view.can_submit());
    }

    #[test]
    fn status_renders_task_phase() {
        let mut view = ready();
        view.apply(Event::Status(TaskStatus::Generating {
            prompt: "quiet night".into(),
        }));
        assert_eq!(view.status, "generating (quiet night)");
    }

    #[test]
    fn stopped_releases_gate() {
        let mut view = ready();
        view.task = TaskState::Busy;
        view.apply(Event::Progress(Progress::Started));
        assert!(view.spinning);
        assert!(view.is_busy());

        view.apply(Event::Progress(Progress::Stopped));
        assert!(!view.spinning);
        assert!(!view.is_busy());
        assert!(view.can_submit());
    }

    #[test]
    fn done_records_output_and_informs() {
        let mut view = ready();
        view.apply(Event::Done("/tmp/night.wav".into()));
        assert_eq!(view.status, "saved: /tmp/night.wav");
        assert_eq!(view.last_output, Some(PathBuf::from("/tmp/night.wav")));
        assert!(matches!(view.notice, Some(Notice::Info(ref m)) if m.contains("/tmp/night.wav")));
    }

    #[test]
    fn error_while_loading_fails_the_model() {
        let mut view = ViewState::default();
        view.apply(Event::Error("model load failed: missing".into()));
        assert_eq!(
            view.model,
            ModelState::Failed("model load failed: missing".into())
        );
        assert_eq!(
            view.notice,
            Some(Notice::Error("model load failed: missing".into()))
        );
        assert!(!view.can_submit());
    }

    #[test]
    fn error_after_ready_keeps_model() {
        let mut view = ready();
        view.apply(Event::Error("translation failed: timeout".into()));
        assert_eq!(view.model, ModelState::Ready);
        assert_eq!(view.status, "an error occurred");
        assert_eq!(
            view.notice,
            Some(Notice::Error("translation failed: timeout".into()))
        );
    }

    #[test]
    fn error_does_not_release_gate() {
        let mut view = ready();
        view.task = TaskState::Busy;
        view.apply(Event::Error("boom".into()));
        assert!(view.is_busy());
    }
}
