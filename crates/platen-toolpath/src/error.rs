//! Error types for toolpath generation.

use thiserror::Error;

/// Errors that can occur while generating or laying out toolpaths.
#[derive(Error, Debug)]
pub enum ToolpathError {
    /// Printing parameters failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Infill is only defined for axis-aligned raster angles.
    #[error("unsupported infill angle {0} deg (only 0 and 90 are supported)")]
    UnsupportedInfillAngle(f64),

    /// A rectangle is too small for the requested pattern.
    #[error("region too small: {0}")]
    RegionTooSmall(String),

    /// A printable path needs at least two points.
    #[error("path needs at least two points, got {0}")]
    PathTooShort(usize),

    /// Retract was requested while the nozzle was already retracted.
    #[error("retract with nozzle already retracted")]
    DoubleRetract,

    /// Unretract was requested while the nozzle was not retracted.
    #[error("unretract with nozzle not retracted")]
    DoubleUnretract,

    /// A cuboid rounds to zero layers.
    #[error("cuboid height {height} mm yields no layers at layer height {layer_height} mm")]
    NoLayers {
        /// Requested cuboid height in mm.
        height: f64,
        /// Configured layer height in mm.
        layer_height: f64,
    },

    /// A region referenced another region that has not been added yet.
    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    /// Two regions were added under the same name.
    #[error("region '{0}' already defined")]
    DuplicateRegion(String),

    /// A region definition is inconsistent.
    #[error("region '{name}': {reason}")]
    InvalidRegion {
        /// Name of the offending region.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No generator exists for the named material.
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for toolpath operations.
pub type Result<T> = std::result::Result<T, ToolpathError>;

/// Non-fatal physical-model violations reported by parameter validation.
///
/// Warnings do not stop generation; they flag parameter sets for which
/// the extrusion cross-section model is no longer meaningful.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintWarning {
    /// The extrusion model assumes a trace at least as wide as it is tall.
    #[error(
        "trace width {trace_width} mm is smaller than layer height {layer_height} mm; \
         the rounded-rectangle cross-section model does not hold"
    )]
    TraceThinnerThanLayer {
        /// Configured trace width in mm.
        trace_width: f64,
        /// Configured layer height in mm.
        layer_height: f64,
    },
}
