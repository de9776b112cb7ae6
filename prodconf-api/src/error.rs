use std::path::PathBuf;

use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while configuring the client or talking to the server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required setting is absent or empty.
    #[error("missing API configuration: {0}")]
    MissingConfig(&'static str),

    /// A setting is present but unusable.
    #[error("invalid API configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse API configuration: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    /// Connection, timeout or protocol failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an `error` field in the body.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Non-success status without an `error` field.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Success status but the body did not decode.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
