//! Google Translate web endpoint client.
//!
//! Calls the keyless `translate_a/single` endpoint:
//!
//! ```text
//! GET {base_url}/translate_a/single?client=gtx&sl=ja&tl=en&dt=t&q=<text>
//! → [[["translated part", "source part", …], …], …]
//! ```
//!
//! Long inputs come back split into several segments; they are joined in
//! order.  All connection details come from [`TranslationConfig`].

use async_trait::async_trait;
use serde_json::Value;

use crate::config::TranslationConfig;

use super::translator::{TranslateError, Translator};

/// Translator backed by the Google Translate web endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    /// Build from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &TranslationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::EmptyText);
        }

        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let translated = parse_segments(&json)?;
        log::debug!("translate: {source}->{target} {text:?} => {translated:?}");
        Ok(translated)
    }
}

/// Join the translated segments of a `translate_a/single` response.
pub(crate) fn parse_segments(json: &Value) -> Result<String, TranslateError> {
    let segments = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Parse("missing segment list".into()))?;

    let joined: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let joined = joined.trim();
    if joined.is_empty() {
        return Err(TranslateError::EmptyResponse);
    }
    Ok(joined.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
