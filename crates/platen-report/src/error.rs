//! Error types for program analysis.

use thiserror::Error;

/// Errors from parsing or rewriting G-code programs.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A program line could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number in the program text.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
