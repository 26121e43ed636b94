//! Error types for the scanner core

use thiserror::Error;

/// Errors surfaced by the scan pipeline and its collaborators
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Listing source error: {0}")]
    Source(String),

    #[error("Catalog lookup error: {0}")]
    Catalog(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    /// Durable dedup lookup failed. Never treated as "not a duplicate".
    #[error("Dedup store error: {0}")]
    DedupStore(String),

    #[error("Detail fetch error: {0}")]
    Enrichment(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Whether the caller may retry the operation on a later cycle.
    ///
    /// Retry policy itself belongs to the collaborator transport; the core
    /// only reports the classification.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScanError::Source(_)
                | ScanError::Catalog(_)
                | ScanError::MarketData(_)
                | ScanError::DedupStore(_)
                | ScanError::Enrichment(_)
                | ScanError::Persistence(_)
                | ScanError::Http(_)
                | ScanError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
