use std::path::PathBuf;

use thiserror::Error;

/// Error types for the Pocket authorization and export flow
#[derive(Error, Debug)]
pub enum PocketError {
    #[error("Failed to create HTTP client: {0}")]
    ClientCreation(String),

    #[error("No config file found at {} -- see README for details: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Pocket rejected the request: HTTP {status}{}{}",
        .error_code.map(|c| format!(", error code {c}")).unwrap_or_default(),
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected {
        status: u16,
        error_code: Option<i32>,
        message: Option<String>,
    },

    #[error("Malformed response from Pocket: {0}")]
    MalformedResponse(String),

    #[error("Cannot parse access token response, app likely not authorized: {0}")]
    NotAuthorized(String),

    #[error("No access token available; authorization has not completed")]
    MissingAccessToken,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Console I/O error: {0}")]
    Console(#[source] std::io::Error),

    #[cfg(feature = "browser")]
    #[error("Failed to open browser: {0}")]
    BrowserLaunch(String),
}

impl PocketError {
    /// Process exit code for this failure.
    ///
    /// Vendor rejections carry Pocket's `X-Error-Code` through when it fits
    /// in an exit status; every other failure exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            PocketError::Rejected {
                error_code: Some(code),
                ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// Result type alias for Pocket operations
pub type Result<T> = std::result::Result<T, PocketError>;
