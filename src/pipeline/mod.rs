//! Task orchestration core for MusicGen Desk.
//!
//! Background workers produce [`Event`]s; the [`Dispatcher`] consumes them on
//! the UI thread and is the only writer of [`ViewState`].
//!
//! # Architecture
//!
//! ```text
//! ModelLifecycleWorker ──┐   (tokio task, once at startup)
//!                        │
//!   GenerationWorker ────┤   (tokio task per admitted request)
//!                        ▼
//!             EventSender ──unbounded mpsc──▶ EventReceiver
//!                                                  │
//!                                                  ▼
//!                              Dispatcher::poll(now)  ← egui update() each frame
//!                                 ├─ Ticker::due
//!                                 └─ ViewState::apply (one match per event)
//!
//! Dispatcher::submit(GenerationRequest)
//!   ├─ model not Ready → SubmitError::ModelNotReady
//!   ├─ task Busy       → SubmitError::Busy
//!   └─ otherwise       → task = Busy, GenerationWorker::spawn
//! ```
//!
//! Every worker runs under [`guard::spawn_guarded`], so failures and panics
//! reach the dispatcher as `Event::Error` and a generation task always ends
//! with `Progress(Stopped)`.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod generation;
pub mod guard;
pub mod loader;
pub mod request;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use dispatcher::{Dispatcher, SubmitError, Ticker};
pub use error::TaskError;
pub use event::{event_channel, Event, EventReceiver, EventSender, Progress, TaskStatus};
pub use generation::GenerationWorker;
pub use loader::ModelLifecycleWorker;
pub use request::{GenerationRequest, RequestError, DURATION_RANGE};
pub use state::{ModelState, Notice, TaskState, ViewState};
