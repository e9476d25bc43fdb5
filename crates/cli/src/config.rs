//! CLI configuration utilities

use anyhow::Result;
use assetdesk_client::ClientConfig;
use std::path::{Path, PathBuf};

const STATE_DIR_ENV: &str = "ASSETDESK_STATE_DIR";
const TOKEN_FILE_NAME: &str = "token";

/// Load the client configuration from `path`, or from defaults and environment only
pub fn load_client_config(path: Option<&Path>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    Ok(config)
}

/// Directory holding CLI state such as the access token
pub fn state_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        // Check environment variable first, then fall back to system data dir
        std::env::var_os(STATE_DIR_ENV).map_or_else(
            || {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("assetdesk")
            },
            PathBuf::from,
        )
    })
}

/// Where the access token is persisted: the configured file, else `<state dir>/token`
pub fn token_path(config: &ClientConfig, state_dir: &Path) -> PathBuf {
    config
        .token_file
        .clone()
        .unwrap_or_else(|| state_dir.join(TOKEN_FILE_NAME))
}
