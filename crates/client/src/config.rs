//! Client configuration

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "ASSETDESK";

/// Connection settings for the Assetdesk API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Path of the token refresh endpoint
    pub refresh_path: String,

    /// File holding the access token between runs
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
            user_agent: concat!("assetdesk-client/", env!("CARGO_PKG_VERSION")).to_string(),
            refresh_path: "/auth/token".to_string(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file, with environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        Self::load(Some(path.as_ref()), env_source())
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        Self::load(None, env_source())
    }

    fn load(file: Option<&Path>, env: config::Environment) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            // Set default values
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("refresh_path", defaults.refresh_path)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Request timeout as a [`Duration`]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(ClientError::Configuration(format!(
                "refresh_path must start with '/': {}",
                self.refresh_path
            )));
        }
        Ok(())
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert((*key).to_string(), (*value).to_string());
        }
        env_source().source(Some(map))
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = ClientConfig::load(None, env(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.refresh_path, "/auth/token");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.token_file.is_none());
    }

    #[test]
    fn file_then_environment_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "base_url = \"https://assets.example.com/api\"\ntimeout_secs = 5\ntoken_file = \"/tmp/assetdesk-token\""
        )
        .unwrap();

        let config = ClientConfig::load(
            Some(file.path()),
            env(&[("ASSETDESK_TIMEOUT_SECS", "12")]),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://assets.example.com/api");
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(
            config.token_file.as_deref(),
            Some(Path::new("/tmp/assetdesk-token"))
        );
    }

    #[test]
    fn rejects_relative_refresh_path() {
        let result = ClientConfig::load(None, env(&[("ASSETDESK_REFRESH_PATH", "auth/token")]));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
