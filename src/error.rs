/// Error types shared across the ingestion pipeline.
///
/// Errors are scoped to the smallest unit they affect: `PointError` and
/// skipped units never leave a parser, `StoreError` never leaves the writer
/// (it becomes a `PointFailure`), and `IngestError` aborts one source's run
/// only.

use std::path::PathBuf;
use thiserror::Error;

/// A point could not be built because one of its invariants failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    #[error("measurement name is empty")]
    EmptyMeasurement,

    #[error("point has no fields")]
    NoFields,

    #[error("field '{0}' is not a finite number")]
    NonFiniteField(String),

    #[error("timestamp {0} precedes the Unix epoch")]
    NegativeTimestamp(i64),
}

/// Errors that abort a single source's ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File missing, unreadable or permission denied.
    #[error("source {path} is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The top-level structure of the source could not be parsed at all.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// Failure delivering one point to the time-series store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected write: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("store connection lock poisoned")]
    Lock,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
