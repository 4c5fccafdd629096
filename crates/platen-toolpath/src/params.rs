//! Per-material printing parameters.
//!
//! All lengths are in mm and all feedrates in mm/s. The generator
//! converts feedrates to the mm/min expected by G-code words once at
//! construction; everything downstream of that boundary is mm/min.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConstraintWarning, Result, ToolpathError};

/// Printing parameters for one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintingParameters {
    /// Nozzle bore diameter (mm).
    pub nozzle_diameter: f64,
    /// Filament diameter (mm).
    pub filament_diameter: f64,
    /// Layer height (mm).
    pub layer_height: f64,
    /// Width of a deposited trace (mm).
    pub trace_width: f64,
    /// Center-to-center spacing of adjacent infill traces (mm).
    pub trace_spacing: f64,
    /// Extrusion multiplier; 0 disables extrusion for dry calibration runs.
    pub extrude_factor: f64,
    /// Travel feedrate (mm/s).
    pub move_feedrate: f64,
    /// Print feedrate (mm/s).
    pub print_feedrate: f64,
    /// Z hop above the layer for travel moves (mm).
    pub nozzle_lift: f64,
    /// Filament pulled back by a retract (mm).
    pub retract_length: f64,
    /// Retract/unretract feedrate (mm/s).
    pub retract_feedrate: f64,
    /// Length of each wipe stroke (mm).
    pub wipe_length: f64,
    /// Wipe feedrate (mm/s).
    pub wipe_feedrate: f64,
}

impl Default for PrintingParameters {
    fn default() -> Self {
        Self {
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            layer_height: 0.2,
            trace_width: 0.4,
            trace_spacing: 0.45,
            extrude_factor: 1.0,
            move_feedrate: 150.0,
            print_feedrate: 40.0,
            nozzle_lift: 1.0,
            retract_length: 1.2,
            retract_feedrate: 35.0,
            wipe_length: 2.0,
            wipe_feedrate: 20.0,
        }
    }
}

impl PrintingParameters {
    /// Validate the parameter set.
    ///
    /// Hard violations (non-positive dimensions or feedrates) are
    /// errors. Soft violations of the extrusion model come back as
    /// [`ConstraintWarning`]s for the caller to report.
    pub fn validate(&self) -> Result<Vec<ConstraintWarning>> {
        if self.nozzle_diameter <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "nozzle_diameter must be positive".into(),
            ));
        }
        if self.filament_diameter <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "filament_diameter must be positive".into(),
            ));
        }
        if self.layer_height <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "layer_height must be positive".into(),
            ));
        }
        if self.trace_width <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "trace_width must be positive".into(),
            ));
        }
        if self.trace_spacing <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "trace_spacing must be positive".into(),
            ));
        }
        if self.extrude_factor < 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "extrude_factor must not be negative".into(),
            ));
        }
        if self.move_feedrate <= 0.0 || self.print_feedrate <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "feedrates must be positive".into(),
            ));
        }
        if self.retract_feedrate <= 0.0 || self.wipe_feedrate <= 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "feedrates must be positive".into(),
            ));
        }
        if self.nozzle_lift < 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "nozzle_lift must not be negative".into(),
            ));
        }
        if self.retract_length < 0.0 || self.wipe_length < 0.0 {
            return Err(ToolpathError::InvalidParameters(
                "retract_length and wipe_length must not be negative".into(),
            ));
        }

        let mut warnings = Vec::new();
        if self.trace_width < self.layer_height {
            warnings.push(ConstraintWarning::TraceThinnerThanLayer {
                trace_width: self.trace_width,
                layer_height: self.layer_height,
            });
        }
        Ok(warnings)
    }
}

/// Load a material-name → parameters map from a JSON file.
pub fn load_material_params(path: &Path) -> Result<BTreeMap<String, PrintingParameters>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Save a material-name → parameters map as pretty-printed JSON.
pub fn save_material_params(
    params: &BTreeMap<String, PrintingParameters>,
    path: &Path,
) -> Result<()> {
    let text = serde_json::to_string_pretty(params)?;
    fs::write(path, text)?;
    Ok(())
}
