//! Error types for the Herma CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Herma operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Login failed. Please check your email and password.")]
    LoginRejected,

    #[error("Session expired and could not be refreshed. Run `herma login` to sign in again.")]
    Unauthorized,

    #[error("Failed to connect to {0}. Please check your connection and try again.")]
    Connection(String),

    #[error("Failed to initialize remote folders: {0}")]
    InitFolders(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            let host = err
                .url()
                .and_then(|u| u.host_str().map(|h| h.to_string()))
                .unwrap_or_else(|| "the server".to_string());
            ApiError::Connection(host)
        } else {
            ApiError::InvalidResponse(err.to_string())
        }
    }
}

/// Errors raised before or while running the external copy tool
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Source folder {0} does not exist.")]
    SourceNotFound(PathBuf),

    #[error("AzCopy is not installed. Install it or set `tool_path` in the config.")]
    ToolNotInstalled,

    #[error("Failed to start the copy tool: {0}")]
    Spawn(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Create one or pass --config.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("No stored session. Run `herma login` to sign in.")]
    MissingTokens,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
