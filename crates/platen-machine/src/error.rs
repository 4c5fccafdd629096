//! Error types for machine control.

use thiserror::Error;

/// Errors from machine configuration and program assembly.
#[derive(Error, Debug)]
pub enum MachineError {
    /// No configuration exists for the named material.
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    /// No cooling fan pin is mapped for a tool.
    #[error("no fan pin configured for tool T{0}")]
    NoFanPin(u8),

    /// Machine settings failed validation.
    #[error("invalid machine settings: {0}")]
    InvalidSettings(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for machine operations.
pub type Result<T> = std::result::Result<T, MachineError>;
