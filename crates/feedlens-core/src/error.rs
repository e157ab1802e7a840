//! Error types for Feedlens.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Record source error: {0}")]
    Source(String),

    #[error("Analyzer error: {0}")]
    Analyzer(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}

pub type Result<T> = std::result::Result<T, Error>;
