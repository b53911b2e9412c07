//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), the `LlmConfig` and
//! `AssessmentConfig` sub-configs, `AppPaths` for the platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AssessmentConfig, LlmConfig, API_KEY_ENV_VARS};
