use std::path::PathBuf;
use thiserror::Error;

/// Error type for the circada library.
///
/// Malformed history rows are deliberately not represented here: a row with a
/// bad timestamp or URL is skipped during extraction and surfaced through
/// `Statistics::skipped_rows` instead of aborting the batch.
#[derive(Error, Debug)]
pub enum Error {
    /// History store missing, unreadable, or the scratch copy failed
    #[error("history store unavailable at {path:?}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    /// Rejected before any store access
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A structured report that doesn't parse back into statistics
    #[error("malformed report: {0}")]
    MalformedReport(String),
}

/// Result type alias for the circada library
pub type Result<T> = std::result::Result<T, Error>;
