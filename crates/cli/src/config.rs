use std::path::PathBuf;

use taskdeck_client::ClientConfig;

use crate::error::CliError;

/// Token file location relative to the platform config directory.
const TOKEN_FILE_SUBPATH: &str = "taskdeck/tokens.json";

/// Everything the binary needs before it can talk to the backend.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub token_file: PathBuf,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                                   |
    /// |----------------------------------|-------------------------------------------|
    /// | `TASKDECK_API_URL`               | `http://localhost:8000/api/v1`            |
    /// | `TASKDECK_REQUEST_TIMEOUT_SECS`  | `30`                                      |
    /// | `TASKDECK_TOKEN_FILE`            | `<config dir>/taskdeck/tokens.json`       |
    pub fn from_env() -> Result<Self, CliError> {
        let client = ClientConfig::from_env()?;
        let token_file = token_file(std::env::var_os("TASKDECK_TOKEN_FILE").map(PathBuf::from))?;
        Ok(Self { client, token_file })
    }
}

/// Explicit override, else the platform config directory.
fn token_file(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => dirs::config_dir()
            .map(|dir| dir.join(TOKEN_FILE_SUBPATH))
            .ok_or(CliError::NoConfigDir),
    }
}
