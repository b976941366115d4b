//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Settings for the generative model collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Pretrained model identifier handed to the loader
    /// (e.g. `"facebook/musicgen-small"`).
    pub identifier: String,
    /// Generator program invoked for each load check and generation.
    ///
    /// Either an absolute path or a bare name looked up on `PATH`.
    pub program: String,
    /// Extra leading arguments, e.g. a script path when `program` is an
    /// interpreter.
    pub program_args: Vec<String>,
    /// Clip length applied right after the model loads, in seconds.
    pub default_duration_secs: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            identifier: "facebook/musicgen-small".into(),
            program: "musicgen-generate".into(),
            program_args: Vec::new(),
            default_duration_secs: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationConfig
// ---------------------------------------------------------------------------

/// Settings for the prompt translation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// When `false` the prompt is sent to the model untranslated.
    pub enabled: bool,
    /// Base URL of the translation endpoint.
    pub base_url: String,
    /// ISO-639-1 language of the user's prompt.
    pub source_lang: String,
    /// ISO-639-1 language the model understands.
    pub target_lang: String,
    /// Maximum seconds to wait for a translation before timing out.
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://translate.googleapis.com".into(),
            source_lang: "ja".into(),
            target_lang: "en".into(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Where generated clips go when the user does not pick a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory pre-filled in the output path field.
    pub default_dir: PathBuf,
    /// File name pre-filled in the output path field.
    pub default_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: AppPaths::new().output_dir,
            default_file_name: "music.wav".into(),
        }
    }
}

impl OutputConfig {
    /// Full default output path (`default_dir/default_file_name`).
    pub fn default_path(&self) -> PathBuf {
        self.default_dir.join(&self.default_file_name)
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Presentation and dispatcher cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Interval between dispatcher ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Upper bound on events applied in a single tick so a flood of events
    /// cannot stall a frame.
    pub max_events_per_tick: usize,
    /// Main window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
    /// Font file with CJK glyphs for Japanese prompts.  `None` probes a few
    /// common system locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cjk_font: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_events_per_tick: 1024,
            window_size: (420.0, 300.0),
            cjk_font: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use musicgen_desk::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generative model settings.
    pub model: ModelConfig,
    /// Prompt translation settings.
    pub translation: TranslationConfig,
    /// Output location defaults.
    pub output: OutputConfig,
    /// UI / dispatcher settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
