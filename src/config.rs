use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::error::ConfigError;

/// Fallback origin for development setups without a config file.
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the remote DeskMate API.
///
/// Resolution order: the `DESKMATE_API_URL` environment variable, then
/// `<config_dir>/deskmate/config.toml`, then the compiled-in default.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // The compiled-in default is a valid URL.
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Build a config pointing at the given origin.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ConfigError::BadBaseUrl(base_url.to_string()))?;
        Ok(Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Resolve the config from the environment, the user config file, or
    /// the default, in that order.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("DESKMATE_API_URL") {
            info!("Using API base URL from DESKMATE_API_URL");
            return Self::with_base_url(&url);
        }

        if let Some(path) = Self::config_file_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Parse a TOML config file of the form:
    ///
    /// ```toml
    /// base_url = "https://helpdesk.example.org/api"
    /// timeout_secs = 30
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: ClientConfig = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!("Loaded API config from {}", path.display());
        Ok(config)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("deskmate").join("config.toml"))
    }

    /// Base URL as a string with no trailing slash, ready for endpoint
    /// paths (which always start with `/`) to be appended.
    pub fn origin(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.origin(), "http://localhost:5000/api");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "base_url = \"https://desk.example.org/api/\"").unwrap();
        writeln!(file, "timeout_secs = 10").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.origin(), "https://desk.example.org/api");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_from_file_timeout_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"https://desk.example.org/api\"\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = 17\n").unwrap();

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ClientConfig::from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_bad_base_url() {
        let err = ClientConfig::with_base_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::BadBaseUrl(_)));
    }
}
