//! Error types for the ronda engine.
//!
//! Missing or malformed inputs are not errors in ronda: calculators yield
//! "undefined" for the affected point and move on. The variants here cover
//! invalid caller input, unknown entities and storage faults.

use thiserror::Error;

/// The main error type for ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// A field name failed validation.
    #[error("Invalid field name: {0}")]
    InvalidField(String),

    /// Error due to invalid or malformed caller-supplied data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when a company is not known to the store.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// Error when a ranking slug is not known to the store.
    #[error("Ranking not found: {0}")]
    RankingNotFound(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The storage backend failed; aborts a recomputation batch.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from serde_json while (de)serializing payloads.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error fetching data from external sources.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl RondaError {
    /// Whether this error must abort a whole batch rather than a single company.
    ///
    /// Only resource-level faults are fatal.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;
