//! Error types for the geoparsing pipeline
//!
//! Per-row and per-geometry failures are contained where they occur; only
//! boundary-load failures terminate a run.

use thiserror::Error;

/// Errors raised by the geoparsing pipeline
#[derive(Debug, Error)]
pub enum GeoparseError {
    /// A numeric field or geometry string could not be parsed
    #[error("parse error in {context}: {detail}")]
    Parse {
        /// Which field or format was being parsed
        context: &'static str,
        /// The offending input
        detail: String,
    },
    /// The gazetteer returned no response object for a candidate string
    #[error("gazetteer query yielded no response for '{candidate}' after {attempts} attempts")]
    TransientQueryFailure {
        candidate: String,
        attempts: u32,
    },
    /// The regional boundary polygon could not be loaded
    #[error("boundary polygon load failed: {0}")]
    BoundaryLoadFailure(String),
    #[error("gazetteer database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeoparseError {
    /// Build a parse error for a named field with the offending input
    pub fn parse(context: &'static str, detail: impl Into<String>) -> Self {
        Self::Parse {
            context,
            detail: detail.into(),
        }
    }
}
