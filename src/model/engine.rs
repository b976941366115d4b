//! Generative model traits and the write-once model slot.
//!
//! # Overview
//!
//! [`ModelLoader`] performs the slow one-time acquisition and hands back a
//! boxed [`MusicModel`].  The lifecycle worker then publishes it into a
//! [`ModelSlot`], after which generation workers share it read-mostly: the
//! only mutation is [`MusicModel::configure`], which single-flight admission
//! keeps from interleaving.
//!
//! [`MockLoader`] / [`MockModel`] (available under `#[cfg(test)]`) record
//! every call so pipeline tests can assert on ordering without a real model.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use thiserror::Error;

use crate::audio::RawAudio;

/// Output sample rate of MusicGen checkpoints.
pub const MUSICGEN_SAMPLE_RATE: u32 = 32_000;

// ---------------------------------------------------------------------------
// ModelError
// ---------------------------------------------------------------------------

/// All errors that can arise from the model collaborator.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The generator program or checkpoint could not be located.
    #[error("model not found: {0}")]
    NotFound(String),

    /// The loader located the model but could not initialise it.
    #[error("model initialisation failed: {0}")]
    Load(String),

    /// The generation call itself failed.
    #[error("generation error: {0}")]
    Generation(String),

    /// [`ModelSlot::publish`] was called a second time.
    #[error("model has already been published")]
    AlreadyPublished,
}

// ---------------------------------------------------------------------------
// GenerationParams
// ---------------------------------------------------------------------------

/// Shared generation configuration applied with [`MusicModel::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    /// Clip length in seconds.
    pub duration_secs: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { duration_secs: 8 }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A loaded text-to-audio model.
///
/// `generate` blocks for the whole inference pass; callers run it on the
/// blocking pool.
pub trait MusicModel: Send {
    /// Replace the shared generation parameters.
    fn configure(&mut self, params: GenerationParams);

    /// Generate a clip for an (English) prompt using the current parameters.
    fn generate(&mut self, prompt: &str) -> Result<RawAudio, ModelError>;

    /// Fixed sample rate of everything `generate` returns.
    fn sample_rate(&self) -> u32;
}

/// One-time, potentially slow, model acquisition.
pub trait ModelLoader: Send + Sync {
    fn load(&self, identifier: &str) -> Result<Box<dyn MusicModel>, ModelError>;
}

// Compile-time assertion: both traits must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn MusicModel>, _: Box<dyn ModelLoader>) {}
};

// ---------------------------------------------------------------------------
// ModelSlot
// ---------------------------------------------------------------------------

/// A published model, shared between generation workers.
pub type SharedModel = Arc<Mutex<Box<dyn MusicModel>>>;

/// Write-once handle to the loaded model.
///
/// Cheap to clone; every clone observes the same publication.  Until
/// [`publish`](Self::publish) succeeds, [`get`](Self::get) returns `None`.
#[derive(Clone, Default)]
pub struct ModelSlot {
    cell: Arc<OnceLock<SharedModel>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a fully constructed model visible to readers.
    ///
    /// # Errors
    ///
    /// [`ModelError::AlreadyPublished`] when a model is already in the slot;
    /// the existing model is left untouched.
    pub fn publish(&self, model: Box<dyn MusicModel>) -> Result<(), ModelError> {
        self.cell
            .set(Arc::new(Mutex::new(model)))
            .map_err(|_| ModelError::AlreadyPublished)
    }

    /// The published model, or `None` before publication.
    pub fn get(&self) -> Option<SharedModel> {
        self.cell.get().cloned()
    }

    pub fn is_published(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl std::fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSlot")
            .field("published", &self.is_published())
            .finish()
    }
}

/// Lock a shared model, recovering from a poisoned mutex.
///
/// A panic mid-generation poisons the lock; the model itself is still
/// usable, and refusing every later request would wedge the app.
pub fn lock_model(model: &SharedModel) -> MutexGuard<'_, Box<dyn MusicModel>> {
    model.lock().unwrap_or_else(|poisoned| {
        log::warn!("model lock was poisoned by an earlier panic; recovering");
        poisoned.into_inner()
    })
}

// ---------------------------------------------------------------------------
// MockModel / MockLoader  (test-only)
// ---------------------------------------------------------------------------

/// A call observed by [`MockModel`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Configure(u32),
    Generate(String),
}

/// Test double returning a pre-configured clip.
#[cfg(test)]
#[derive(Clone)]
pub struct MockModel {
    output: Result<RawAudio, ModelError>,
    panic_on_generate: bool,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

#[cfg(test)]
impl MockModel {
    /// Always returns `Ok(output)`.
    pub fn ok(output: RawAudio) -> Self {
        Self {
            output: Ok(output),
            panic_on_generate: false,
            calls: Default::default(),
        }
    }

    /// Always returns `Err(error)`.
    pub fn err(error: ModelError) -> Self {
        Self {
            output: Err(error),
            panic_on_generate: false,
            calls: Default::default(),
        }
    }

    /// Panics inside `generate`.
    pub fn panicking() -> Self {
        Self {
            panic_on_generate: true,
            ..Self::ok(RawAudio::Mono(vec![0.0]))
        }
    }

    /// Shared log of every call made on this model and its clones.
    pub fn calls(&self) -> Arc<Mutex<Vec<MockCall>>> {
        Arc::clone(&self.calls)
    }
}

#[cfg(test)]
impl MusicModel for MockModel {
    fn configure(&mut self, params: GenerationParams) {
        self.calls
            .lock()
            .unwrap()
            .push(MockCall::Configure(params.duration_secs));
    }

    fn generate(&mut self, prompt: &str) -> Result<RawAudio, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push(MockCall::Generate(prompt.to_string()));
        if self.panic_on_generate {
            panic!("inference kernel crashed");
        }
        self.output.clone()
    }

    fn sample_rate(&self) -> u32 {
        MUSICGEN_SAMPLE_RATE
    }
}

/// Test double that hands out a [`MockModel`] after an optional delay.
#[cfg(test)]
pub struct MockLoader {
    model: Result<MockModel, ModelError>,
    delay: std::time::Duration,
}

#[cfg(test)]
impl MockLoader {
    pub fn ok(model: MockModel) -> Self {
        Self {
            model: Ok(model),
            delay: std::time::Duration::ZERO,
        }
    }

    pub fn err(error: ModelError) -> Self {
        Self {
            model: Err(error),
            delay: std::time::Duration::ZERO,
        }
    }

    /// Sleep for `delay` inside `load` to widen race windows.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[cfg(test)]
impl ModelLoader for MockLoader {
    fn load(&self, _identifier: &str) -> Result<Box<dyn MusicModel>, ModelError> {
        std::thread::sleep(self.delay);
        self.model
            .clone()
            .map(|m| Box::new(m) as Box<dyn MusicModel>)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_empty_until_published() {
        let slot = ModelSlot::new();
        assert!(!slot.is_published());
        assert!(slot.get().is_none());
    }

    #[test]
    fn publication_is_visible_to_clones() {
        let slot = ModelSlot::new();
        let reader = slot.clone();
        slot.publish(Box::new(MockModel::ok(RawAudio::Mono(vec![0.0]))))
            .unwrap();
        assert!(reader.is_published());
        assert_eq!(lock_model(&reader.get().unwrap()).sample_rate(), 32_000);
    }

    #[test]
    fn second_publish_is_rejected_and_keeps_first() {
        let slot = ModelSlot::new();
        let first = MockModel::ok(RawAudio::Mono(vec![1.0]));
        let calls = first.calls();
        slot.publish(Box::new(first)).unwrap();

        let err = slot
            .publish(Box::new(MockModel::ok(RawAudio::Mono(vec![2.0]))))
            .unwrap_err();
        assert!(matches!(err, ModelError::AlreadyPublished));

        let out = lock_model(&slot.get().unwrap()).generate("x").unwrap();
        assert_eq!(out, RawAudio::Mono(vec![1.0]));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let slot = ModelSlot::new();
        slot.publish(Box::new(MockModel::panicking())).unwrap();
        let model = slot.get().unwrap();

        let cloned = Arc::clone(&model);
        let joined = std::thread::spawn(move || {
            let _ = lock_model(&cloned).generate("boom");
        })
        .join();
        assert!(joined.is_err());
        assert!(model.is_poisoned());

        lock_model(&model).configure(GenerationParams { duration_secs: 4 });
    }

    #[test]
    fn model_error_display_includes_detail() {
        let e = ModelError::NotFound("/opt/musicgen".into());
        assert!(e.to_string().contains("/opt/musicgen"));
    }

    #[test]
    fn mock_loader_hands_out_shared_call_log() {
        let model = MockModel::ok(RawAudio::Mono(vec![0.0]));
        let calls = model.calls();
        let mut loaded = MockLoader::ok(model).load("facebook/musicgen-small").unwrap();
        loaded.configure(GenerationParams { duration_secs: 6 });
        assert_eq!(*calls.lock().unwrap(), vec![MockCall::Configure(6)]);
    }
}
