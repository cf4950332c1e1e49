//! Error types for notion-qa.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a run. None of these are recovered from.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error: {0}")]
    Usage(String),

    #[error("Missing: Notion authentication key or page ID")]
    MissingCredentials,

    #[error("Error: Invalid page ID ({0})")]
    InvalidPageId(String),

    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Markdown error: {0}")]
    Markdown(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}
