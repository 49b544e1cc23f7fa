//! Persistent assistant settings.
//!
//! Settings are a small JSON record read once at startup and rewritten only
//! on explicit save. Missing fields fall back to their defaults, and a
//! missing file is replaced by a freshly written default file.

use crate::error::{AssistantError, Result};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Slowest accepted speech rate, in words per minute.
pub const MIN_SPEECH_RATE: u32 = 50;
/// Fastest accepted speech rate, in words per minute.
pub const MAX_SPEECH_RATE: u32 = 300;
/// Quietest accepted volume.
pub const MIN_VOLUME: f32 = 0.1;
/// Loudest accepted volume.
pub const MAX_VOLUME: f32 = 1.0;

/// User-facing assistant settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Index into the platform voice list.
    pub voice_id: usize,
    /// Speech rate in words per minute (50–300).
    pub speech_rate: u32,
    /// Accepted wake words (case-insensitive, substring-matched).
    pub wake_words: Vec<String>,
    /// Display theme.
    pub theme: Theme,
    /// Speech volume (0.1–1.0).
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_id: 0,
            speech_rate: 150,
            wake_words: vec!["elisa".to_owned(), "elesa".to_owned(), "aleesa".to_owned()],
            theme: Theme::default(),
            volume: 1.0,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AssistantError::Settings(e.to_string()))
    }

    /// Save settings to a JSON file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the settings cannot
    /// be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AssistantError::Settings(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load settings, writing a default file first when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed or the default
    /// file cannot be written.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let defaults = Self::default();
            defaults.save_to_file(path)?;
            return Ok(defaults);
        }
        Self::from_file(path)
    }

    /// Returns the default settings file path: `~/.config/elisa/settings.json`.
    pub fn default_settings_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("elisa").join("settings.json")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("elisa")
                .join("settings.json")
        } else {
            PathBuf::from("/tmp/elisa-config/settings.json")
        }
    }

    /// Set the speech rate, clamped to the accepted range.
    pub fn set_speech_rate(&mut self, rate: u32) {
        self.speech_rate = rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE);
    }

    /// Set the volume, clamped to the accepted range.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(MIN_VOLUME, MAX_VOLUME);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_match_expected_values() {
        let settings = Settings::default();
        assert_eq!(settings.voice_id, 0);
        assert_eq!(settings.speech_rate, 150);
        assert_eq!(settings.wake_words, vec!["elisa", "elesa", "aleesa"]);
        assert_eq!(settings.theme, Theme::Dark);
        assert!((settings.volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.voice_id = 2;
        settings.speech_rate = 180;
        settings.volume = 0.5;

        settings.save_to_file(&path).unwrap();
        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_or_init_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(!path.exists());

        let loaded = Settings::load_or_init(&path).unwrap();
        assert_eq!(loaded, Settings::default());
        assert!(path.exists());

        // The written file loads back identically.
        let reloaded = Settings::from_file(&path).unwrap();
        assert_eq!(reloaded, Settings::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let partial = r#"{ "speech_rate": 200 }"#;
        let settings: Settings = serde_json::from_str(partial).unwrap();
        assert_eq!(settings.speech_rate, 200);
        assert_eq!(settings.voice_id, 0);
        assert_eq!(settings.wake_words, vec!["elisa", "elesa", "aleesa"]);
        assert!((settings.volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = Settings::from_file(Path::new("/nonexistent/path/settings.json"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "this is not valid json {{{").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn default_settings_path_ends_with_settings_json() {
        let path = Settings::default_settings_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("settings.json"));
        assert!(path_str.contains("elisa"));
    }

    #[test]
    fn rate_and_volume_are_clamped() {
        let mut settings = Settings::default();
        settings.set_speech_rate(10);
        assert_eq!(settings.speech_rate, MIN_SPEECH_RATE);
        settings.set_speech_rate(1000);
        assert_eq!(settings.speech_rate, MAX_SPEECH_RATE);
        settings.set_volume(0.0);
        assert!((settings.volume - MIN_VOLUME).abs() < f32::EPSILON);
        settings.set_volume(2.0);
        assert!((settings.volume - MAX_VOLUME).abs() < f32::EPSILON);
    }
}
