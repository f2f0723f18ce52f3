//! Settings and configuration utilities.
//!
//! Settings are read from `$HOME/.contrib-truth/settings.json` and act as a
//! fallback for environment variables, so API keys can live in one file
//! instead of the shell profile.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Directory under `$HOME` holding the settings file.
const SETTINGS_DIR: &str = ".contrib-truth";

/// Settings loaded from `$HOME/.contrib-truth/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path. A missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(SETTINGS_DIR).join("settings.json"))
    }

    /// Returns an environment variable, falling back to the settings file.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }

    /// Returns the first of `keys` that resolves to a non-blank value.
    pub fn get_first_env_var(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get_env_var(key))
            .find(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_settings(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("settings.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn settings_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_settings(
            &temp_dir,
            r#"{
                "env": {
                    "CONTRIB_TRUTH_SETTINGS_TEST_VAR": "test_value",
                    "GEMINI_API_KEY": "test_api_key"
                }
            }"#,
        );

        let settings = Settings::load_from_path(&path).unwrap();

        assert_eq!(
            settings.env.get("CONTRIB_TRUTH_SETTINGS_TEST_VAR").unwrap(),
            "test_value"
        );
        assert_eq!(settings.env.get("GEMINI_API_KEY").unwrap(), "test_api_key");
    }

    #[test]
    fn missing_file_is_empty_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(temp_dir.path().join("nope.json")).unwrap();
        assert!(settings.env.is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_settings(&temp_dir, "{ not json");
        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn environment_takes_precedence_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_settings(
            &temp_dir,
            r#"{ "env": { "CONTRIB_TRUTH_PRECEDENCE_VAR": "from_file" } }"#,
        );
        let settings = Settings::load_from_path(&path).unwrap();

        env::set_var("CONTRIB_TRUTH_PRECEDENCE_VAR", "from_env");
        assert_eq!(
            settings.get_env_var("CONTRIB_TRUTH_PRECEDENCE_VAR").unwrap(),
            "from_env"
        );

        env::remove_var("CONTRIB_TRUTH_PRECEDENCE_VAR");
        assert_eq!(
            settings.get_env_var("CONTRIB_TRUTH_PRECEDENCE_VAR").unwrap(),
            "from_file"
        );
    }

    #[test]
    fn first_non_blank_key_wins() {
        let settings = Settings {
            env: HashMap::from([
                ("CONTRIB_TRUTH_FIRST_A".to_string(), "  ".to_string()),
                ("CONTRIB_TRUTH_FIRST_B".to_string(), "b".to_string()),
            ]),
        };
        assert_eq!(
            settings
                .get_first_env_var(&["CONTRIB_TRUTH_FIRST_MISSING", "CONTRIB_TRUTH_FIRST_A", "CONTRIB_TRUTH_FIRST_B"])
                .as_deref(),
            Some("b")
        );
    }
}
