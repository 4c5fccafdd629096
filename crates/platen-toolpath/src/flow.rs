//! Extrusion flow physics.
//!
//! A deposited trace is modeled as a rounded rectangle: a `width x
//! height` core with two semicircular caps of radius `height / 2`.
//! Conservation of volume between that cross-section and the incoming
//! filament cylinder gives the filament length to feed per mm of
//! travel.

use std::f64::consts::PI;

/// Filament length (mm) to extrude for a trace of `trace_length` mm.
///
/// `multiplier` scales the result; 0 yields no extrusion. The model
/// requires `trace_width >= layer_height`, which parameter validation
/// reports on separately.
pub fn extrusion_length(
    trace_length: f64,
    trace_width: f64,
    layer_height: f64,
    filament_diameter: f64,
    multiplier: f64,
) -> f64 {
    let area_out =
        (trace_width - layer_height) * layer_height + PI * layer_height * layer_height / 4.0;
    let area_in = PI * filament_diameter * filament_diameter / 4.0;
    area_out / area_in * trace_length * multiplier
}
