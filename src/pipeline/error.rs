//! Task failure taxonomy.
//!
//! Every variant renders to the human-readable text carried by
//! [`Event::Error`](super::event::Event::Error).

use thiserror::Error;
use tokio::task::JoinError;

use crate::audio::PersistError;
use crate::model::ModelError;
use crate::translate::TranslateError;

/// Text of the precondition failure raised when no model is published.
pub const MODEL_NOT_READY: &str = "model not ready";

/// Errors that end a background task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The model could not be loaded; generation stays disabled.
    #[error("model load failed: {0}")]
    Initialization(ModelError),

    #[error("translation failed: {0}")]
    Translation(#[from] TranslateError),

    /// The model call failed or returned unusable audio.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("could not save the file: {0}")]
    Persistence(#[from] PersistError),

    /// The task should never have been started.
    #[error("{0}")]
    Precondition(String),

    /// A worker panicked or was torn down.
    #[error("unexpected fault: {0}")]
    Fault(String),
}

impl TaskError {
    pub fn model_not_ready() -> Self {
        TaskError::Precondition(MODEL_NOT_READY.into())
    }
}

impl From<JoinError> for TaskError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            TaskError::Fault(panic_message(err.into_panic()))
        } else {
            TaskError::Fault("task was cancelled".into())
        }
    }
}

/// Best-effort text from a panic payload.
pub fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_not_ready_renders_plainly() {
        assert_eq!(TaskError::model_not_ready().to_string(), "model not ready");
    }

    #[test]
    fn translation_error_keeps_detail() {
        let err: TaskError = TranslateError::Request("connection refused".into()).into();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn panic_message_handles_str_and_string() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42u8)), "unknown panic payload");
    }

    #[tokio::test]
    async fn join_error_from_panic_is_fault() {
        let err = tokio::spawn(async {
            panic!("kaboom");
        })
        .await
        .unwrap_err();
        let err = TaskError::from(err);
        assert!(matches!(&err, TaskError::Fault(msg) if msg == "kaboom"), "got {err:?}");
    }
}
