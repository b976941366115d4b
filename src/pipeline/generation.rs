//! Generation worker: translate → generate → save for one request.
//!
//! # Protocol
//!
//! ```text
//! Status(Translating)
//!   └─▶ translator.translate                       Err → Error
//!         └─▶ ModelSlot::get                       None → Error("model not ready")
//!               └─▶ configure(duration)
//!                     Status(Generating { prompt })
//!                     └─▶ spawn_blocking(generate) Err → Error
//!                           └─▶ into_buffer (mono → one row)
//!                                 └─▶ spawn_blocking(sink.save) Err → Error
//!                                       Done(path)
//! Progress(Stopped)                                ← always, from the guard
//! ```
//!
//! Blocking collaborator calls run on `tokio::task::spawn_blocking` so the
//! async runtime never stalls.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::audio::AudioSink;
use crate::config::TranslationConfig;
use crate::model::{lock_model, GenerationParams, ModelSlot};
use crate::translate::Translator;

use super::error::TaskError;
use super::event::{Event, EventSender, TaskStatus};
use super::guard::{spawn_guarded, Lifecycle};
use super::request::GenerationRequest;

/// Everything a generation task needs, injected once at startup.
///
/// Cheap to clone (`Arc` clones); each accepted request runs on its own
/// clone.
#[derive(Clone)]
pub struct GenerationWorker {
    translator: Arc<dyn Translator>,
    slot: ModelSlot,
    sink: Arc<dyn AudioSink>,
    source_lang: String,
    target_lang: String,
}

impl GenerationWorker {
    pub fn new(
        translator: Arc<dyn Translator>,
        slot: ModelSlot,
        sink: Arc<dyn AudioSink>,
        translation: &TranslationConfig,
    ) -> Self {
        Self {
            translator,
            slot,
            sink,
            source_lang: translation.source_lang.clone(),
            target_lang: translation.target_lang.clone(),
        }
    }

    /// Start a task for `request`.
    ///
    /// Admission control is the caller's job; the worker itself only
    /// re-checks that a model has been published.
    pub fn spawn(
        &self,
        runtime: &Handle,
        events: EventSender,
        request: GenerationRequest,
    ) -> JoinHandle<()> {
        let worker = self.clone();
        let body_events = events.clone();
        spawn_guarded(runtime, events, "generation", Lifecycle::Tracked, async move {
            worker.run(request, body_events).await
        })
    }

    async fn run(self, request: GenerationRequest, events: EventSender) -> Result<Event, TaskError> {
        // ── 1. Translate ─────────────────────────────────────────────────
        events.send(Event::Status(TaskStatus::Translating));
        let translated = self
            .translator
            .translate(request.prompt(), &self.source_lang, &self.target_lang)
            .await?;
        log::debug!("generation: {:?} => {:?}", request.prompt(), translated);

        // ── 2. Readiness ─────────────────────────────────────────────────
        let model = self.slot.get().ok_or_else(TaskError::model_not_ready)?;

        // ── 3. Configure + generate ──────────────────────────────────────
        lock_model(&model).configure(GenerationParams {
            duration_secs: request.duration_secs(),
        });
        events.send(Event::Status(TaskStatus::Generating {
            prompt: translated.clone(),
        }));

        let (raw, sample_rate) = tokio::task::spawn_blocking(move || {
            let mut model = lock_model(&model);
            let raw = model.generate(&translated)?;
            Ok::<_, crate::model::ModelError>((raw, model.sample_rate()))
        })
        .await?
        .map_err(|e| TaskError::Generation(e.to_string()))?;

        // ── 4. Normalise + persist ───────────────────────────────────────
        let buffer = raw
            .into_buffer()
            .map_err(|e| TaskError::Generation(e.to_string()))?;
        log::info!(
            "generation: {} frames x {} ch @ {} Hz",
            buffer.frames(),
            buffer.channel_count(),
            sample_rate
        );

        let sink = Arc::clone(&self.sink);
        let path = request.output().to_path_buf();
        tokio::task::spawn_blocking(move || sink.save(&path, &buffer, sample_rate)).await??;

        Ok(Event::Done(request.output().to_path_buf()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
