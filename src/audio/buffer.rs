//! Channel-major sample buffers.
//!
//! The model hands back either a flat mono sequence or one row per channel
//! ([`RawAudio`]).  Persistence always wants the 2-D shape, so
//! [`RawAudio::into_buffer`] promotes a flat sequence to a single row.
//!
//! # Example
//!
//! ```rust
//! use musicgen_desk::audio::RawAudio;
//!
//! let buffer = RawAudio::Mono(vec![0.1, 0.2, 0.3]).into_buffer().unwrap();
//! assert_eq!(buffer.channel_count(), 1);
//! assert_eq!(buffer.frames(), 3);
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// ShapeError
// ---------------------------------------------------------------------------

/// The model output cannot be arranged as `[channel][frame]`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// No channels or no samples at all.
    #[error("model returned no audio samples")]
    Empty,

    /// Channels disagree on their length.
    #[error("channel {channel} has {found} samples, expected {expected}")]
    Ragged {
        channel: usize,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// RawAudio
// ---------------------------------------------------------------------------

/// Audio exactly as the model produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAudio {
    /// Single-channel flat sequence.
    Mono(Vec<f32>),
    /// One row per channel.
    Channels(Vec<Vec<f32>>),
}

impl RawAudio {
    /// Normalise into a rectangular [`AudioBuffer`].
    pub fn into_buffer(self) -> Result<AudioBuffer, ShapeError> {
        match self {
            RawAudio::Mono(samples) => AudioBuffer::from_channels(vec![samples]),
            RawAudio::Channels(rows) => AudioBuffer::from_channels(rows),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioBuffer
// ---------------------------------------------------------------------------

/// Rectangular `[channel][frame]` sample matrix.
///
/// Always holds at least one channel with at least one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build from rows, rejecting empty or ragged input.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self, ShapeError> {
        let expected = channels.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(ShapeError::Empty);
        }
        if let Some((channel, row)) = channels
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            return Err(ShapeError::Ragged {
                channel,
                expected,
                found: row.len(),
            });
        }
        Ok(Self { channels })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Frame-interleaved samples (`L R L R …` for stereo), the order WAV
    /// files store them in.
    pub fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.frames()).flat_map(move |frame| self.channels.iter().map(move |ch| ch[frame]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
