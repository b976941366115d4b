//! MusicGen Desk: turn a short Japanese description into a music clip.
//!
//! The prompt is translated to English, handed to a MusicGen model, and the
//! generated audio is saved as a WAV file.  All slow work runs on background
//! tokio tasks; the [`pipeline`] module coordinates them with the egui
//! front end in [`app`].

pub mod app;
pub mod audio;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod translate;
