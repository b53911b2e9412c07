//! Cross-platform configuration paths using the `dirs` crate.
//!
//! Layout:
//!
//!   Windows: %APPDATA%\speaking-tutor\settings.toml
//!   macOS:   ~/Library/Application Support/speaking-tutor/settings.toml
//!   Linux:   ~/.config/speaking-tutor/settings.toml

use std::path::PathBuf;

/// Resolved configuration locations.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "speaking-tutor";

    /// Resolves paths using the `dirs` crate, falling back to the current
    /// directory when the platform has no standard config location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_in_app_dir() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.starts_with(&paths.config_dir));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths.config_dir.ends_with("speaking-tutor"));
    }
}
