//! Persistence collaborator: writes generated clips to disk.
//!
//! [`AudioSink`] is the seam the generation worker saves through.
//! [`WavSink`] is the production implementation (32-bit float WAV via
//! `hound`).  [`RecordingSink`] (test-only) captures what it was asked to
//! save without touching the filesystem.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;

use super::buffer::AudioBuffer;

// ---------------------------------------------------------------------------
// PersistError
// ---------------------------------------------------------------------------

/// Errors raised while saving a clip.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The output path is empty or otherwise unusable.
    #[error("invalid output path: {0}")]
    InvalidPath(String),

    /// Filesystem failure (directory creation, permissions …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `hound` failed to encode or finalise the file.
    #[error("WAV encoding failed: {0}")]
    Encoding(#[from] hound::Error),

    /// Too many channels for the WAV header.
    #[error("unsupported channel count: {0}")]
    ChannelCount(usize),
}

// ---------------------------------------------------------------------------
// AudioSink trait
// ---------------------------------------------------------------------------

/// Writes a playable audio file.
///
/// Called from the blocking pool, so implementations may do synchronous I/O.
pub trait AudioSink: Send + Sync {
    fn save(&self, path: &Path, audio: &AudioBuffer, sample_rate: u32) -> Result<(), PersistError>;
}

// ---------------------------------------------------------------------------
// WavSink
// ---------------------------------------------------------------------------

/// Saves clips as IEEE-float WAV files, creating parent directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavSink;

impl AudioSink for WavSink {
    fn save(&self, path: &Path, audio: &AudioBuffer, sample_rate: u32) -> Result<(), PersistError> {
        if path.as_os_str().is_empty() {
            return Err(PersistError::InvalidPath("path is empty".into()));
        }
        if path.is_dir() {
            return Err(PersistError::InvalidPath(format!(
                "{} is a directory",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let channels = u16::try_from(audio.channel_count())
            .map_err(|_| PersistError::ChannelCount(audio.channel_count()))?;
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for sample in audio.interleaved() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        log::debug!(
            "wav: wrote {} frames x {} ch @ {} Hz to {}",
            audio.frames(),
            channels,
            sample_rate,
            path.display()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingSink  (test-only)
// ---------------------------------------------------------------------------

/// What a [`RecordingSink`] was asked to save.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct SavedClip {
    pub path: std::path::PathBuf,
    pub channels: usize,
    pub frames: usize,
    pub sample_rate: u32,
}

/// Test double that records every save call and optionally fails.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    saved: std::sync::Mutex<Vec<SavedClip>>,
    fail: bool,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every save fails with an I/O error.
    pub fn failing() -> Self {
        Self {
            saved: Default::default(),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<SavedClip> {
        self.saved.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl AudioSink for RecordingSink {
    fn save(&self, path: &Path, audio: &AudioBuffer, sample_rate: u32) -> Result<(), PersistError> {
        if self.fail {
            return Err(PersistError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "disk is read-only",
            )));
        }
        self.saved.lock().unwrap().push(SavedClip {
            path: path.to_path_buf(),
            channels: audio.channel_count(),
            frames: audio.frames(),
            sample_rate,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RawAudio;
    use tempfile::tempdir;

    #[test]
    fn writes_readable_float_wav() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("clip.wav");
        let buffer = RawAudio::Mono(vec![0.0, 0.25, -0.25, 1.0]).into_buffer().unwrap();

        WavSink.save(&path, &buffer, 32_000).expect("save");

        let mut reader = hound::WavReader::open(&path).expect("open");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 32_000);
        assert_eq!(spec.sample_format, SampleFormat::Float);
        let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0.0, 0.25, -0.25, 1.0]);
    }

    #[test]
    fn stereo_is_interleaved_on_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("stereo.wav");
        let buffer = RawAudio::Channels(vec![vec![0.1, 0.2], vec![-0.1, -0.2]])
            .into_buffer()
            .unwrap();

        WavSink.save(&path, &buffer, 32_000).expect("save");

        let mut reader = hound::WavReader::open(&path).expect("open");
        assert_eq!(reader.spec().channels, 2);
        let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0.1, -0.1, 0.2, -0.2]);
    }

    #[test]
    fn empty_path_is_rejected() {
        let buffer = RawAudio::Mono(vec![0.0]).into_buffer().unwrap();
        let err = WavSink.save(Path::new(""), &buffer, 32_000).unwrap_err();
        assert!(matches!(err, PersistError::InvalidPath(_)));
    }

    #[test]
    fn directory_path_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let buffer = RawAudio::Mono(vec![0.0]).into_buffer().unwrap();
        let err = WavSink.save(dir.path(), &buffer, 32_000).unwrap_err();
        assert!(matches!(err, PersistError::InvalidPath(_)));
    }

    #[test]
    fn recording_sink_captures_shape() {
        let sink = RecordingSink::new();
        let buffer = RawAudio::Mono(vec![0.0; 10]).into_buffer().unwrap();
        sink.save(Path::new("out.wav"), &buffer, 32_000).unwrap();
        assert_eq!(
            sink.saved(),
            vec![SavedClip {
                path: "out.wav".into(),
                channels: 1,
                frames: 10,
                sample_rate: 32_000,
            }]
        );
    }
}
