#![warn(missing_docs)]

//! Toolpath and G-code generation for direct-write printing.
//!
//! This crate turns rectangular print regions into G-code: rounded
//! rectangle extrusion flow, retract and wipe cycles, rectangular
//! perimeters, boustrophedon infill, and multi-layer cuboids. Regions
//! are laid out by name on the build surface and each carries the
//! material it is printed with.
//!
//! # Example
//!
//! ```ignore
//! use platen_toolpath::{MaterialSet, Point2, PrintingParameters, RegionTable};
//!
//! let mut table = RegionTable::new(Point2::new(100.0, 100.0));
//! for spec in specs {
//!     table.add_region(spec)?;
//! }
//!
//! let mut materials = MaterialSet::new(params_by_material)?;
//! for region in table.iter() {
//!     let generator = materials.generator_mut(&region.material)?;
//!     let gcode = generator.print_region(region, &Default::default())?;
//!     print!("{gcode}");
//! }
//! ```

pub mod error;
pub mod flow;
pub mod gcode;
pub mod generator;
pub mod layout;
pub mod params;
pub mod pattern;
pub mod state;

pub use platen_math::{Point2, Point3, Rect, Vec2};

pub use error::{ConstraintWarning, Result, ToolpathError};
pub use flow::extrusion_length;
pub use gcode::Gcode;
pub use generator::{
    CuboidLayers, RegionOverrides, SurfaceOptions, ToolpathGenerator, ZKey,
};
pub use layout::{
    DimensionSpec, LayerRef, PositionSpec, PrintLimits, Region, RegionKind, RegionSpec,
    RegionTable, XEdge, XPlacement, YEdge, YPlacement,
};
pub use params::{load_material_params, save_material_params, PrintingParameters};
pub use pattern::{infill_points, perimeter_loop, InfillAngle, StartCorner};
pub use state::NozzleState;

use std::collections::BTreeMap;

/// Toolpath generators keyed by material name.
///
/// Each material prints with its own parameters and keeps its own
/// nozzle state, so interleaving regions of different materials never
/// crosses retraction bookkeeping between tools.
#[derive(Debug)]
pub struct MaterialSet {
    generators: BTreeMap<String, ToolpathGenerator>,
}

impl MaterialSet {
    /// Build a generator per material, validating each parameter set.
    pub fn new(params: BTreeMap<String, PrintingParameters>) -> Result<Self> {
        let mut generators = BTreeMap::new();
        for (name, params) in params {
            generators.insert(name, ToolpathGenerator::new(params)?);
        }
        Ok(Self { generators })
    }

    /// Look up a material's generator.
    pub fn get(&self, material: &str) -> Option<&ToolpathGenerator> {
        self.generators.get(material)
    }

    /// Look up a material's generator mutably.
    pub fn get_mut(&mut self, material: &str) -> Option<&mut ToolpathGenerator> {
        self.generators.get_mut(material)
    }

    /// The generator for `material`, or an error naming the material.
    pub fn generator_mut(&mut self, material: &str) -> Result<&mut ToolpathGenerator> {
        self.generators
            .get_mut(material)
            .ok_or_else(|| ToolpathError::UnknownMaterial(material.to_string()))
    }

    /// Material names in sorted order.
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// True when no materials are configured.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_set_keeps_per_material_parameters() {
        let mut params = BTreeMap::new();
        params.insert("pla".to_string(), PrintingParameters::default());
        params.insert(
            "petg".to_string(),
            PrintingParameters {
                print_feedrate: 30.0,
                ..PrintingParameters::default()
            },
        );

        let set = MaterialSet::new(params).unwrap();
        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set.materials().collect();
        assert_eq!(names, vec!["petg", "pla"]);
        assert!((set.get("petg").unwrap().params().print_feedrate - 30.0).abs() < 1e-12);
        assert!((set.get("pla").unwrap().params().print_feedrate - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_material_is_an_error() {
        let mut set = MaterialSet::new(BTreeMap::new()).unwrap();
        assert!(set.is_empty());
        assert!(matches!(
            set.generator_mut("abs"),
            Err(ToolpathError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_invalid_parameters_fail_set_construction() {
        let bad = PrintingParameters {
            layer_height: 0.0,
            ..PrintingParameters::default()
        };
        let mut params = BTreeMap::new();
        params.insert("pla".to_string(), bad);
        assert!(MaterialSet::new(params).is_err());
    }
}
