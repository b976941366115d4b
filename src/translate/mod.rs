//! Prompt translation collaborator.
//!
//! * [`Translator`] - async trait implemented by all backends.
//! * [`GoogleTranslator`] - Google Translate web endpoint.
//! * [`IdentityTranslator`] - pass-through when translation is off.
//! * [`TranslateError`] - error variants for translation.

pub mod google;
pub mod translator;

use std::sync::Arc;

use crate::config::TranslationConfig;

pub use google::GoogleTranslator;
pub use translator::{IdentityTranslator, TranslateError, Translator};

#[cfg(test)]
pub use translator::MockTranslator;

/// Pick the translator the config asks for.
///
/// Disabled translation, or identical source and target languages, yields
/// the pass-through translator.
pub fn from_config(config: &TranslationConfig) -> Arc<dyn Translator> {
    if !config.enabled || config.source_lang == config.target_lang {
        log::info!("translate: disabled, prompts are used verbatim");
        Arc::new(IdentityTranslator)
    } else {
        Arc::new(GoogleTranslator::from_config(config))
    }
}
