//! Audio output: sample shaping and persistence.
//!
//! # Pipeline
//!
//! ```text
//! MusicModel::generate → RawAudio → into_buffer() → AudioBuffer
//!                                                     └─▶ AudioSink::save → .wav
//! ```

pub mod buffer;
pub mod wav;

pub use buffer::{AudioBuffer, RawAudio, ShapeError};
pub use wav::{AudioSink, PersistError, WavSink};

#[cfg(test)]
pub use wav::{RecordingSink, SavedClip};
