//! Kiosk configuration
//!
//! Settings live in a camelCase `config.json`. Every section falls back to
//! its defaults field by field, so a file only needs the values it changes.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.json";

const PLACEHOLDER_SDK_KEY: &str = "YOUR_CLIENT_ID";
const PLACEHOLDER_SDK_SECRET: &str = "YOUR_CLIENT_SECRET";
const PLACEHOLDER_PMI: &str = "1234567890";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoomConfig {
    pub sdk_key: String,
    pub sdk_secret: String,
    /// Personal Meeting ID joined on startup
    pub pmi: String,
    pub passcode: String,
    pub display_name: String,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            sdk_key: String::new(),
            sdk_secret: String::new(),
            pmi: String::new(),
            passcode: String::new(),
            display_name: "REMOTE-PC-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenConfig {
    /// 0 shares the primary monitor
    pub monitor_index: u32,
    pub share_computer_sound: bool,
    pub stereo_audio: bool,
    pub optimize_for_video: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            monitor_index: 0,
            share_computer_sound: true,
            stereo_audio: true,
            optimize_for_video: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteControlConfig {
    pub auto_accept: bool,
    pub enable_clipboard: bool,
}

impl Default for RemoteControlConfig {
    fn default() -> Self {
        Self {
            auto_accept: true,
            enable_clipboard: true,
        }
    }
}

/// Retry ceiling and backoff bounds for the recovery watchdog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecoveryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackConfig {
    /// Inter-action wait multiplier
    pub speed: f64,
    pub recording_path: PathBuf,
    /// Pause between another participant joining and the replay starting
    pub replay_delay_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            recording_path: PathBuf::from("user-prefs.json"),
            replay_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct KioskConfig {
    pub zoom: ZoomConfig,
    pub screen: ScreenConfig,
    pub remote_control: RemoteControlConfig,
    pub recovery: RecoveryConfig,
    pub playback: PlaybackConfig,
}

impl KioskConfig {
    /// Read and parse a config file, without validation
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Clamp out-of-range values and collect warnings about missing
    /// credentials. Never fails.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.zoom.sdk_key.is_empty() || self.zoom.sdk_key == PLACEHOLDER_SDK_KEY {
            warnings.push("Zoom SDK Key is not configured".to_string());
        }
        if self.zoom.sdk_secret.is_empty() || self.zoom.sdk_secret == PLACEHOLDER_SDK_SECRET {
            warnings.push("Zoom SDK Secret is not configured".to_string());
        }
        if self.zoom.pmi.is_empty() || self.zoom.pmi == PLACEHOLDER_PMI {
            warnings.push("Zoom PMI is not configured".to_string());
        }

        if self.recovery.max_retries < 1 {
            self.recovery.max_retries = 1;
            warnings.push("Invalid max retries, defaulting to 1".to_string());
        }
        if self.recovery.initial_backoff_ms > self.recovery.max_backoff_ms {
            self.recovery.initial_backoff_ms = self.recovery.max_backoff_ms;
            warnings.push("Initial backoff exceeds max backoff, clamping".to_string());
        }
        if !self.playback.speed.is_finite() || self.playback.speed <= 0.0 {
            self.playback.speed = 1.0;
            warnings.push("Invalid playback speed, defaulting to 1.0".to_string());
        }

        warnings
    }
}

/// Platform configuration directory, e.g. `%APPDATA%\zoom-kiosk\config`
pub fn platform_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "zoom-kiosk").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Candidate config locations in lookup order
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    if let Some(path) = platform_config_path() {
        paths.push(path);
    }
    paths
}

/// First existing config file, if any
pub fn find_config_path() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.exists())
}

/// Load, merge and validate the configuration.
///
/// Missing or unreadable files fall back to defaults with a warning.
pub fn load_config() -> KioskConfig {
    match find_config_path() {
        Some(path) => load_config_from(&path),
        None => {
            tracing::warn!(
                "No {} found, using default configuration. Please edit it with your Zoom SDK credentials.",
                CONFIG_FILE_NAME
            );
            KioskConfig::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> KioskConfig {
    let mut config = match KioskConfig::load_from(path) {
        Ok(config) => {
            tracing::info!("Loaded configuration from {:?}", path);
            config
        }
        Err(e) => {
            tracing::error!("Error loading config {:?}: {}", path, e);
            tracing::warn!("Using default configuration");
            KioskConfig::default()
        }
    };

    let warnings = config.validate();
    if !warnings.is_empty() {
        tracing::warn!("Configuration warnings:");
        for warning in &warnings {
            tracing::warn!("  - {}", warning);
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"zoom": {"sdkKey": "abc", "pmi": "555 123 4567"}, "recovery": {"maxRetries": 3}}"#,
        )
        .unwrap();

        let config = KioskConfig::load_from(&path).unwrap();
        assert_eq!(config.zoom.sdk_key, "abc");
        assert_eq!(config.zoom.display_name, "REMOTE-PC-01");
        assert_eq!(config.recovery.max_retries, 3);
        assert_eq!(config.recovery.initial_backoff_ms, 1000);
        assert_eq!(config.recovery.max_backoff_ms, 30000);
        assert_eq!(config.playback.replay_delay_ms, 3000);
        assert!(config.screen.stereo_audio);
    }

    #[test]
    fn test_validate_clamps_and_warns() {
        let mut config = KioskConfig::default();
        config.recovery.max_retries = 0;
        config.recovery.initial_backoff_ms = 60_000;
        config.zoom.sdk_key = PLACEHOLDER_SDK_KEY.to_string();

        let warnings = config.validate();
        assert_eq!(config.recovery.max_retries, 1);
        assert_eq!(config.recovery.initial_backoff_ms, 30_000);
        assert!(warnings.iter().any(|w| w.contains("SDK Key")));
        assert!(warnings.iter().any(|w| w.contains("PMI")));
    }

    #[test]
    fn test_fully_configured_has_no_warnings() {
        let mut config = KioskConfig::default();
        config.zoom.sdk_key = "key".into();
        config.zoom.sdk_secret = "secret".into();
        config.zoom.pmi = "9876543210".into();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(KioskConfig::load_from(&path), Err(ConfigError::Parse(_))));
        assert_eq!(load_config_from(&path).recovery, RecoveryConfig::default());
    }

    #[test]
    fn test_save_writes_camel_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        KioskConfig::default().save_to(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"maxBackoffMs\": 30000"));
        assert!(raw.contains("\"remoteControl\""));
        assert_eq!(KioskConfig::load_from(&path).unwrap(), KioskConfig::default());
    }
}
