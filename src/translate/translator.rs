//! Core `Translator` trait, its error type and the pass-through
//! implementation.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors that can occur while translating a prompt.
#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    /// Nothing to translate.
    #[error("prompt is empty")]
    EmptyText,

    /// HTTP transport, connection or status error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The response body was not the expected JSON shape.
    #[error("failed to parse translation response: {0}")]
    Parse(String),

    /// The service answered but produced no text.
    #[error("translation service returned an empty result")]
    EmptyResponse,
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async text translation.
///
/// Implementors must be `Send + Sync` so they can sit behind an
/// `Arc<dyn Translator>` shared by every generation worker.
///
/// # Arguments
/// * `text`   – text to translate.
/// * `source` – ISO-639-1 code of `text` (e.g. `"ja"`).
/// * `target` – ISO-639-1 code to translate into (e.g. `"en"`).
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslateError>;
}

// ---------------------------------------------------------------------------
// IdentityTranslator
// ---------------------------------------------------------------------------

/// Returns the input unchanged.  Used when translation is disabled or the
/// source and target languages match.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, TranslateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::EmptyText);
        }
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// MockTranslator  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured response.
#[cfg(test)]
pub struct MockTranslator {
    response: Result<String, TranslateError>,
}

#[cfg(test)]
impl MockTranslator {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    pub fn err(error: TranslateError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, TranslateError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_returns_trimmed_input() {
        let out = IdentityTranslator.translate("  calm piano ", "en", "en").await.unwrap();
        assert_eq!(out, "calm piano");
    }

    #[tokio::test]
    async fn identity_rejects_blank_input() {
        let err = IdentityTranslator.translate("   ", "ja", "en").await.unwrap_err();
        assert!(matches!(err, TranslateError::EmptyText));
    }

    #[test]
    fn translator_is_object_safe() {
        let _: Box<dyn Translator> = Box::new(IdentityTranslator);
    }

    #[test]
    fn error_display_carries_detail() {
        let e = TranslateError::Request("connection refused".into());
        assert!(e.to_string().contains("connection refused"));
    }
}
