//! Model lifecycle worker: loads the model once and publishes it.
//!
//! ```text
//! ModelStatus("loading")
//!   └─▶ spawn_blocking(loader.load)
//!         ├─ Ok  → configure(default duration) → ModelSlot::publish → ModelReady
//!         └─ Err → Error("model load failed: …")
//! ```
//!
//! There are no retries.  After a failure the slot stays empty and the
//! dispatcher keeps rejecting submissions.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::ModelConfig;
use crate::model::{GenerationParams, ModelLoader, ModelSlot};

use super::error::TaskError;
use super::event::{Event, EventSender};
use super::guard::{spawn_guarded, Lifecycle};

/// Splash text while the model loads.
pub const LOADING_STATUS: &str = "loading";
/// Splash text once the model is published.
pub const LOADED_STATUS: &str = "loaded";

/// One-shot task that acquires the model and publishes it into a
/// [`ModelSlot`].
pub struct ModelLifecycleWorker {
    loader: Arc<dyn ModelLoader>,
    slot: ModelSlot,
    identifier: String,
    default_params: GenerationParams,
}

impl ModelLifecycleWorker {
    pub fn new(loader: Arc<dyn ModelLoader>, slot: ModelSlot, config: &ModelConfig) -> Self {
        Self {
            loader,
            slot,
            identifier: config.identifier.clone(),
            default_params: GenerationParams {
                duration_secs: config.default_duration_secs,
            },
        }
    }

    /// Run the load in the background.  Consumes the worker so it can only
    /// ever run once.
    pub fn spawn(self, runtime: &Handle, events: EventSender) -> JoinHandle<()> {
        let body_events = events.clone();
        spawn_guarded(runtime, events, "model-load", Lifecycle::Silent, async move {
            self.run(body_events).await
        })
    }

    async fn run(self, events: EventSender) -> Result<Event, TaskError> {
        events.send(Event::ModelStatus(LOADING_STATUS.into()));
        log::info!("model: loading '{}'", self.identifier);

        let loader = Arc::clone(&self.loader);
        let identifier = self.identifier.clone();
        let mut model = tokio::task::spawn_blocking(move || loader.load(&identifier))
            .await?
            .map_err(TaskError::Initialization)?;

        model.configure(self.default_params);

        // Publication is the last write; readers see a fully configured model.
        self.slot
            .publish(model)
            .map_err(TaskError::Initialization)?;
        log::info!("model: '{}' published", self.identifier);

        events.send(Event::ModelStatus(LOADED_STATUS.into()));
        Ok(Event::ModelReady)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RawAudio;
    use crate::model::{MockCall, MockLoader, MockModel, ModelError};
    use crate::pipeline::event::event_channel;

    fn config() -> ModelConfig {
        ModelConfig {
            default_duration_secs: 8,
            ..ModelConfig::default()
        }
    }

    #[tokio::test]
    async fn success_publishes_then_reports_ready() {
        let model = MockModel::ok(RawAudio::Mono(vec![0.0]));
        let calls = model.calls();
        let slot = ModelSlot::new();
        let (tx, mut rx) = event_channel();

        ModelLifecycleWorker::new(Arc::new(MockLoader::ok(model)), slot.clone(), &config())
            .spawn(&Handle::current(), tx)
            .await
            .unwrap();

        let events: Vec<Event> = std::iter::from_fn(|| rx.try_recv()).collect();
        assert_eq!(
            events,
            vec![
                Event::ModelStatus("loading".into()),
                Event::ModelStatus("loaded".into()),
                Event::ModelReady,
            ]
        );
        assert!(slot.is_published());
        assert_eq!(*calls.lock().unwrap(), vec![MockCall::Configure(8)]);
    }

    #[tokio::test]
    async fn failure_reports_error_and_leaves_slot_empty() {
        let slot = ModelSlot::new();
        let (tx, mut rx) = event_channel();

        ModelLifecycleWorker::new(
            Arc::new(MockLoader::err(ModelError::NotFound("musicgen-generate".into()))),
            slot.clone(),
            &config(),
        )
        .spawn(&Handle::current(), tx)
        .await
        .unwrap();

        let events: Vec<Event> = std::iter::from_fn(|| rx.try_recv()).collect();
        assert_eq!(events.len(), 2, "{events:?}");
        assert_eq!(events[0], Event::ModelStatus("loading".into()));
        assert!(
            matches!(&events[1], Event::Error(msg) if msg.starts_with("model load failed") && msg.contains("musicgen-generate")),
            "{events:?}"
        );
        assert!(!events.contains(&Event::ModelReady));
        assert!(!slot.is_published());
    }

    #[tokio::test]
    async fn already_published_slot_is_an_error() {
        let slot = ModelSlot::new();
        slot.publish(Box::new(MockModel::ok(RawAudio::Mono(vec![0.0]))))
            .unwrap();
        let (tx, mut rx) = event_channel();

        ModelLifecycleWorker::new(
            Arc::new(MockLoader::ok(MockModel::ok(RawAudio::Mono(vec![1.0])))),
            slot,
            &config(),
        )
        .spawn(&Handle::current(), tx)
        .await
        .unwrap();

        let last = std::iter::from_fn(|| rx.try_recv()).last();
        assert!(matches!(last, Some(Event::Error(msg)) if msg.contains("already been published")));
    }
}
