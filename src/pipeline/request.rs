//! Validated generation requests.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Accepted clip lengths in seconds.
pub const DURATION_RANGE: RangeInclusive<u32> = 4..=15;

/// Why a request was refused at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("enter a description of the music")]
    EmptyPrompt,

    #[error("choose where to save the file")]
    MissingOutput,

    #[error("duration must be between {min} and {max} seconds, got {got}")]
    DurationOutOfRange { got: u32, min: u32, max: u32 },
}

/// One generation job: what to generate, for how long, and where to save it.
///
/// Only constructible through [`GenerationRequest::new`], so every instance
/// is valid and immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    output: PathBuf,
    duration_secs: u32,
}

impl GenerationRequest {
    /// Validate and build a request.
    ///
    /// The prompt is trimmed.  An output path without an extension gets
    /// `.wav` appended.
    ///
    /// ```
    /// use musicgen_desk::pipeline::GenerationRequest;
    ///
    /// let req = GenerationRequest::new("  calm piano ", "out/clip", 8).unwrap();
    /// assert_eq!(req.prompt(), "calm piano");
    /// assert_eq!(req.output(), std::path::Path::new("out/clip.wav"));
    /// ```
    pub fn new(
        prompt: impl AsRef<str>,
        output: impl AsRef<Path>,
        duration_secs: u32,
    ) -> Result<Self, RequestError> {
        let prompt = prompt.as_ref().trim();
        if prompt.is_empty() {
            return Err(RequestError::EmptyPrompt);
        }

        let output = output.as_ref();
        if output.as_os_str().is_empty() || output.file_name().is_none() {
            return Err(RequestError::MissingOutput);
        }
        let output = if output.extension().is_none() {
            output.with_extension("wav")
        } else {
            output.to_path_buf()
        };

        if !DURATION_RANGE.contains(&duration_secs) {
            return Err(RequestError::DurationOutOfRange {
                got: duration_secs,
                min: *DURATION_RANGE.start(),
                max: *DURATION_RANGE.end(),
            });
        }

        Ok(Self {
            prompt: prompt.to_string(),
            output,
            duration_secs,
        })
    }

    /// The prompt in the user's language.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_keeps_fields() {
        let req = GenerationRequest::new("静かな夜", "/tmp/night.wav", 5).unwrap();
        assert_eq!(req.prompt(), "静かな夜");
        assert_eq!(req.output(), Path::new("/tmp/night.wav"));
        assert_eq!(req.duration_secs(), 5);
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert_eq!(
            GenerationRequest::new("   ", "a.wav", 8),
            Err(RequestError::EmptyPrompt)
        );
    }

    #[test]
    fn empty_output_is_rejected() {
        assert_eq!(
            GenerationRequest::new("calm piano", "", 8),
            Err(RequestError::MissingOutput)
        );
    }

    #[test]
    fn root_output_is_rejected() {
        assert_eq!(
            GenerationRequest::new("calm piano", "/", 8),
            Err(RequestError::MissingOutput)
        );
    }

    #[test]
    fn wav_extension_is_appended() {
        let req = GenerationRequest::new("calm piano", "clips/calm", 8).unwrap();
        assert_eq!(req.output(), Path::new("clips/calm.wav"));
    }

    #[test]
    fn existing_extension_is_kept() {
        let req = GenerationRequest::new("calm piano", "clips/calm.flac", 8).unwrap();
        assert_eq!(req.output(), Path::new("clips/calm.flac"));
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(GenerationRequest::new("p", "a.wav", 4).is_ok());
        assert!(GenerationRequest::new("p", "a.wav", 15).is_ok());
        assert_eq!(
            GenerationRequest::new("p", "a.wav", 3),
            Err(RequestError::DurationOutOfRange {
                got: 3,
                min: 4,
                max: 15
            })
        );
        assert!(GenerationRequest::new("p", "a.wav", 16).is_err());
    }
}
