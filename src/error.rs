use std::path::PathBuf;

use thiserror::Error;

/// Failures turning a file into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clause {0} not found")]
    NotFound(i64),
}

/// Document-level failures. Any of these means nothing was written for the
/// document.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("insufficient text extracted: {chars} characters (need at least {min})")]
    InsufficientText { chars: usize, min: usize },

    #[error("no clauses identified in the document")]
    NoClauses,

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProcessError {
    /// Input problems, as opposed to tool or storage failures.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InsufficientText { .. } | Self::NoClauses)
    }
}
