//! Generative model collaborator.
//!
//! # Architecture
//!
//! ```text
//! ModelLoader::load(identifier) ──▶ Box<dyn MusicModel>
//!                                          │ ModelSlot::publish (once)
//!                                          ▼
//!                                   ModelSlot ──get()──▶ generation workers
//!                                                         configure → generate
//! ```

pub mod command;
pub mod engine;

pub use command::{CommandModel, CommandModelLoader};
pub use engine::{
    lock_model, GenerationParams, ModelError, ModelLoader, ModelSlot, MusicModel, SharedModel,
    MUSICGEN_SAMPLE_RATE,
};

// test-only re-export so pipeline tests can reach the doubles directly.
#[cfg(test)]
pub use engine::{MockCall, MockLoader, MockModel};
