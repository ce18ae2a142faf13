use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the upload/processing server.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a readable JSON answer: connection failure,
    /// timeout, or a body that does not decode.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered but reported `success: false`.
    #[error("server rejected the request{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected { message: Option<String> },
    #[error("cannot build endpoint url for {path:?}: {reason}")]
    InvalidEndpoint { path: String, reason: String },
    #[error("invalid asset path {path:?}: {reason}")]
    InvalidAssetPath { path: String, reason: String },
}

impl ServiceError {
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url {url:?}: {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("server url must be http or https, got {0}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("{0:?} has no file name")]
    InvalidName(PathBuf),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
