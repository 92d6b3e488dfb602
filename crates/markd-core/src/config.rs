//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/markd/config.toml)
//! 3. Environment variables (MARKD_* prefix)
//!
//! Environment variables take precedence over config file values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable prefix
const ENV_PREFIX: &str = "MARKD";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read or write the config file
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be serialized
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the bookmark storage service
    #[serde(default)]
    pub service_url: Option<String>,

    /// WebSocket URL of the realtime feed
    #[serde(default)]
    pub feed_url: Option<String>,

    /// API key for the storage service and feed
    #[serde(default)]
    pub api_key: Option<String>,

    /// Owner id this device acts as
    #[serde(default)]
    pub owner: Option<String>,
}

impl Config {
    /// Load configuration from the default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MARKD_SERVICE_URL, MARKD_FEED_URL,
    ///    MARKD_API_KEY, MARKD_OWNER)
    /// 2. Config file (~/.config/markd/config.toml or MARKD_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(toml_content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_SERVICE_URL", ENV_PREFIX)) {
            self.service_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_FEED_URL", ENV_PREFIX)) {
            self.feed_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_API_KEY", ENV_PREFIX)) {
            self.api_key = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_OWNER", ENV_PREFIX)) {
            self.owner = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })
    }

    /// Get the config file path
    ///
    /// Can be overridden with the MARKD_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("markd")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "MARKD_SERVICE_URL",
        "MARKD_FEED_URL",
        "MARKD_API_KEY",
        "MARKD_OWNER",
    ];

    #[test]
    fn test_default_config() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::default();
        assert!(config.service_url.is_none());
        assert!(config.feed_url.is_none());
        assert!(config.api_key.is_none());
        assert!(config.owner.is_none());
    }

    #[test]
    fn test_env_override_service_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MARKD_SERVICE_URL", "https://api.example.com");
        config.apply_env_overrides();
        assert_eq!(
            config.service_url,
            Some("https://api.example.com".to_string())
        );

        // Empty string clears it
        env::set_var("MARKD_SERVICE_URL", "");
        config.apply_env_overrides();
        assert!(config.service_url.is_none());
    }

    #[test]
    fn test_env_override_owner() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MARKD_OWNER", "owner-1");
        config.apply_env_overrides();
        assert_eq!(config.owner, Some("owner-1".to_string()));
    }

    #[test]
    fn test_serialization_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            service_url: Some("https://api.example.com".to_string()),
            feed_url: Some("wss://feed.example.com".to_string()),
            api_key: Some("key-123".to_string()),
            owner: Some("owner-1".to_string()),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.service_url, config.service_url);
        assert_eq!(parsed.feed_url, config.feed_url);
        assert_eq!(parsed.api_key, config.api_key);
        assert_eq!(parsed.owner, config.owner);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            service_url = "https://api.example.com"
            feed_url = "wss://feed.example.com"
            owner = "owner-1"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(
            config.service_url,
            Some("https://api.example.com".to_string())
        );
        assert_eq!(config.feed_url, Some("wss://feed.example.com".to_string()));
        assert_eq!(config.owner, Some("owner-1".to_string()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.service_url.is_none());
        assert!(config.owner.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("markd").join("config.toml");

        let config = Config {
            service_url: Some("https://api.example.com".to_string()),
            owner: Some("owner-1".to_string()),
            ..Default::default()
        };
        config.save_to_path(&path).unwrap();

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded.service_url, config.service_url);
        assert_eq!(reloaded.owner, config.owner);
    }
}
