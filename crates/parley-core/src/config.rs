use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParleyError, Result};

/// Top-level configuration for the Parley client.
///
/// Loaded from `~/.parley/config.toml` by default. Each section corresponds
/// to a bounded concern of the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParleyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote endpoint settings for the query and transcription services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// URL of the query service.
    pub query_url: String,
    /// URL of the transcription service.
    pub transcribe_url: String,
    /// Per-request timeout in seconds. A stalled remote must not strand a
    /// pending exchange indefinitely.
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            query_url: "http://localhost:8000/api/query".to_string(),
            transcribe_url: "http://localhost:8000/api/transcribe".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Conversation history persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Directory holding persisted snapshots.
    pub dir: String,
    /// Namespaced key the conversation snapshot is stored under.
    pub key: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: "~/.parley/history".to_string(),
            key: "parley_chat_history".to_string(),
        }
    }
}

/// Audio capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Upper bound on the assembled clip size in bytes.
    pub max_clip_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            // Generous for a short voice query in a webm container.
            max_clip_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ParleyConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.endpoints.query_url, "http://localhost:8000/api/query");
        assert_eq!(
            config.endpoints.transcribe_url,
            "http://localhost:8000/api/transcribe"
        );
        assert_eq!(config.endpoints.request_timeout_secs, 30);
        assert_eq!(config.history.key, "parley_chat_history");
        assert_eq!(config.capture.max_clip_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[endpoints]
query_url = "https://bot.example.com/api/query"
transcribe_url = "https://bot.example.com/api/transcribe"
request_timeout_secs = 10

[history]
dir = "/var/lib/parley"
key = "support_widget"
"#;
        let file = create_temp_config(content);
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.endpoints.query_url, "https://bot.example.com/api/query");
        assert_eq!(config.endpoints.request_timeout_secs, 10);
        assert_eq!(config.history.dir, "/var/lib/parley");
        assert_eq!(config.history.key, "support_widget");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        // Remaining fields use defaults
        assert_eq!(config.endpoints.request_timeout_secs, 30);
        assert_eq!(config.history.key, "parley_chat_history");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = ParleyConfig::load(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ParleyConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let file = create_temp_config("this is not toml {{{{");
        let config = ParleyConfig::load_or_default(file.path());
        assert_eq!(config.history.key, "parley_chat_history");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ParleyConfig::default();
        config.save(&path).unwrap();

        let reloaded = ParleyConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, config.general.log_level);
        assert_eq!(reloaded.endpoints.query_url, config.endpoints.query_url);
        assert_eq!(reloaded.history.key, config.history.key);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");

        ParleyConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = ParleyConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: ParleyConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.endpoints.query_url, config.endpoints.query_url);
        assert_eq!(deserialized.capture.max_clip_bytes, config.capture.max_clip_bytes);
    }
}
