//! The one wrapper every worker entry point runs under.
//!
//! ```text
//! [Progress(Started)]          ← Tracked tasks only
//! body events…                 ← emitted by the worker itself
//! Ok(terminal) | Error(msg)    ← exactly one, from the guard
//! [Progress(Stopped)]          ← Tracked tasks only, always
//! ```
//!
//! The body runs as its own tokio task so a panic inside it surfaces as a
//! `JoinError` here instead of unwinding through the runtime.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::error::TaskError;
use super::event::{Event, EventSender, Progress};

/// Whether a task brackets its events with progress notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Only the terminal event is added (model loading).
    Silent,
    /// `Progress(Started)` first, `Progress(Stopped)` last (generation).
    Tracked,
}

/// Spawn `body` on `runtime` and translate its outcome into events.
///
/// `Ok(event)` is forwarded as the terminal event; an `Err` or a panic
/// becomes [`Event::Error`].  For [`Lifecycle::Tracked`] tasks a
/// `Progress(Stopped)` follows the terminal event no matter what.
pub fn spawn_guarded<F>(
    runtime: &Handle,
    events: EventSender,
    name: &'static str,
    lifecycle: Lifecycle,
    body: F,
) -> JoinHandle<()>
where
    F: Future<Output = Result<Event, TaskError>> + Send + 'static,
{
    let inner = runtime.clone();
    runtime.spawn(async move {
        if lifecycle == Lifecycle::Tracked {
            events.send(Event::Progress(Progress::Started));
        }

        let outcome = match inner.spawn(body).await {
            Ok(result) => result,
            Err(join_err) => Err(TaskError::from(join_err)),
        };

        let terminal = match outcome {
            Ok(event) => {
                debug_assert!(event.is_terminal(), "{name}: non-terminal outcome {event:?}");
                log::info!("{name}: finished with {event:?}");
                event
            }
            Err(err) => {
                log::error!("{name}: {err}");
                Event::Error(err.to_string())
            }
        };
        events.send(terminal);

        if lifecycle == Lifecycle::Tracked {
            events.send(Event::Progress(Progress::Stopped));
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
