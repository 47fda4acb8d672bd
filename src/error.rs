use std::io;
use thiserror::Error;
use serde::{Serialize, Deserialize};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BlogError {
    /// Auth failures force the session back to anonymous.
    pub fn is_auth(&self) -> bool {
        matches!(self, BlogError::Auth(_))
    }

    /// Map a non-success HTTP status plus the server's message onto the taxonomy.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => BlogError::Auth(message),
            404 => BlogError::NotFound(message),
            400 | 409 | 422 => BlogError::Validation(message),
            _ => BlogError::Network(format!("HTTP {}: {}", status, message)),
        }
    }

    /// Short text for the status line.
    pub fn notice(&self) -> String {
        match self {
            BlogError::Network(m)
            | BlogError::Auth(m)
            | BlogError::NotFound(m)
            | BlogError::Parse(m)
            | BlogError::Validation(m)
            | BlogError::Io(m)
            | BlogError::Json(m)
            | BlogError::Config(m) => m.clone(),
        }
    }
}

impl From<serde_json::Error> for BlogError {
    fn from(err: serde_json::Error) -> Self {
        BlogError::Json(err.to_string())
    }
}

impl From<io::Error> for BlogError {
    fn from(err: io::Error) -> Self {
        BlogError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for BlogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => BlogError::from_status(status.as_u16(), err.to_string()),
            None => BlogError::Network(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for BlogError {
    fn from(err: anyhow::Error) -> Self {
        BlogError::Config(format!("{:#}", err))
    }
}
