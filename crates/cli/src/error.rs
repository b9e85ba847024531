use taskdeck_client::config::ConfigError;
use taskdeck_client::ApiError;

/// Top-level error for a CLI invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No platform config directory and no `TASKDECK_TOKEN_FILE`.
    #[error("Cannot locate a config directory; set TASKDECK_TOKEN_FILE")]
    NoConfigDir,

    /// The command needs a session but no tokens are stored.
    #[error("Not logged in; run `taskdeck login` first")]
    NotLoggedIn,

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}
