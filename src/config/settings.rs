//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to the
//! request-handling context by value.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variables checked (in order) for the feedback-model API key.
pub const API_KEY_ENV_VARS: &[&str] = &["SPEAKING_TUTOR_API_KEY", "OPENAI_API_KEY"];

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the external feedback model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (no trailing `/v1`).
    pub base_url: String,
    /// API key.  `None` or blank means the model is not configured and no
    /// call is ever attempted.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Hard upper bound on one model call, in seconds.
    pub timeout_secs: u64,
    /// `max_tokens` sent with each request.
    pub max_tokens: u32,
    /// Ask the provider for a JSON-object response (`response_format`).
    pub json_mode: bool,
    /// Maximum characters of a raw model/error body kept for diagnostics.
    pub error_excerpt_chars: usize,
    /// Language the tutor comment and correction reasons are written in.
    pub feedback_language: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.3,
            timeout_secs: 20,
            max_tokens: 600,
            json_mode: true,
            error_excerpt_chars: 500,
            feedback_language: "English".into(),
        }
    }
}

impl LlmConfig {
    /// The API key, if one is present and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// AssessmentConfig
// ---------------------------------------------------------------------------

/// Limits for the local comparison step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Longest accepted `targetText` / `transcriptText`, in characters.
    pub max_input_chars: usize,
    /// DP tables larger than this many cells are computed on the blocking
    /// thread pool instead of an async worker.
    pub blocking_threshold_cells: usize,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 1_000,
            blocking_threshold_cells: 40_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use speaking_tutor::config::AppConfig;
///
/// // Load (returns Default when file is missing), then let the environment
/// // supply the API key.
/// let mut config = AppConfig::load().unwrap();
/// config.apply_env_overrides();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Feedback model settings.
    pub llm: LlmConfig,
    /// Local comparison limits.
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
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

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override the API key from the process environment
    /// (see [`API_KEY_ENV_VARS`]).
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// injectable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());

        if let Some(key) = from_env {
            self.llm.api_key = Some(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.api_key, loaded.llm.api_key);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);
        assert_eq!(original.llm.temperature, loaded.llm.temperature);
        assert_eq!(original.llm.json_mode, loaded.llm.json_mode);
        assert_eq!(
            original.assessment.max_input_chars,
            loaded.assessment.max_input_chars
        );
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.llm.model, LlmConfig::default().model);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o\"\ntimeout_secs = 5\n").unwrap();

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.llm.base_url, "https://api.openai.com");
        assert_eq!(config.assessment.max_input_chars, 1_000);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.timeout_secs, 20);
        assert_eq!(cfg.llm.error_excerpt_chars, 500);
        assert!(cfg.llm.credential().is_none());
        assert_eq!(cfg.assessment.blocking_threshold_cells, 40_000);
    }

    #[test]
    fn blank_key_is_not_a_credential() {
        let mut llm = LlmConfig::default();
        llm.api_key = Some("   ".into());
        assert!(llm.credential().is_none());
        llm.api_key = Some(" sk-test ".into());
        assert_eq!(llm.credential(), Some("sk-test"));
    }

    #[test]
    fn env_override_prefers_first_non_blank_variable() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some("from-file".into());
        cfg.apply_overrides_from(|name| match name {
            "SPEAKING_TUTOR_API_KEY" => Some("  ".into()),
            "OPENAI_API_KEY" => Some("sk-env".into()),
            _ => None,
        });
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn env_override_keeps_file_key_when_unset() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some("from-file".into());
        cfg.apply_overrides_from(|_| None);
        assert_eq!(cfg.llm.api_key.as_deref(), Some("from-file"));
    }
}
