//! Error types for the apparatus criticus client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page has no csrfmiddlewaretoken input")]
    MissingCsrfToken,

    /// A newer request superseded this one
    #[error("Response superseded by a newer request")]
    Stale,
}

pub type Result<T> = std::result::Result<T, ClientError>;
