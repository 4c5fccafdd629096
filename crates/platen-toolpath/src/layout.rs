//! Region layout on the build surface.
//!
//! Regions are named rectangles placed either absolutely (offset from
//! the table origin) or relative to an already-added region: abutting
//! one of its edges or offset from its lower-left corner. Resolution
//! is single-pass, so specs must arrive in dependency order; forward
//! references are errors, not deferred work.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use platen_math::{Point2, Rect, Vec2};

use crate::error::{Result, ToolpathError};
use crate::pattern::{InfillAngle, StartCorner};

/// What gets printed inside a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Infilled surface, optionally with a perimeter.
    Surface,
    /// Perimeter outline only.
    Perimeter,
}

/// Vertical placement of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerRef {
    /// Layer index; Z is the index times the material's layer height.
    Index(u32),
    /// Absolute height in mm.
    Height(f64),
}

impl LayerRef {
    /// The Z height in mm for a given layer height.
    pub fn z_for(&self, layer_height: f64) -> f64 {
        match self {
            LayerRef::Index(index) => f64::from(*index) * layer_height,
            LayerRef::Height(z) => *z,
        }
    }
}

/// Horizontal anchor for a relative position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XPlacement {
    /// Abut an edge of the reference region.
    Edge(XEdge),
    /// Offset in mm from the reference's lower-left corner.
    Offset(f64),
}

/// Which side of the reference a region abuts horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XEdge {
    /// Flush against the reference's left edge, extending left.
    Left,
    /// Flush against the reference's right edge, extending right.
    Right,
}

/// Vertical anchor for a relative position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YPlacement {
    /// Abut an edge of the reference region.
    Edge(YEdge),
    /// Offset in mm from the reference's lower-left corner.
    Offset(f64),
}

/// Which side of the reference a region abuts vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YEdge {
    /// Flush against the reference's bottom edge, extending down.
    Bottom,
    /// Flush against the reference's top edge, extending up.
    Top,
}

/// Where a region's rectangle goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionSpec {
    /// Lower-left corner as an offset from the table origin.
    Absolute([f64; 2]),
    /// Placed against or offset from a previously added region.
    Relative {
        /// Name of the reference region.
        relative_to: String,
        /// Horizontal placement against the reference.
        x: XPlacement,
        /// Vertical placement against the reference.
        y: YPlacement,
    },
}

/// How big a region's rectangle is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionSpec {
    /// Width and height in mm.
    Absolute([f64; 2]),
    /// The reference region's dimensions plus a delta.
    Relative {
        /// Name of the reference region.
        relative_to: String,
        /// Added to the reference's width and height (mm).
        delta: [f64; 2],
    },
}

fn default_overlap_factor() -> f64 {
    0.25
}

fn default_factor() -> f64 {
    1.0
}

/// An unresolved region definition, as read from a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Unique region name; also used as the G-code comment heading.
    pub name: String,
    /// What to print inside the region.
    pub kind: RegionKind,
    /// Material (and therefore tool) this region is printed with.
    pub material: String,
    /// Horizontal placement.
    pub position: PositionSpec,
    /// Rectangle size.
    pub dimensions: DimensionSpec,
    /// Layer index; exclusive with `z_height`.
    #[serde(default)]
    pub layer: Option<u32>,
    /// Absolute print height in mm; exclusive with `layer`.
    #[serde(default)]
    pub z_height: Option<f64>,
    /// Pattern start corner.
    #[serde(default)]
    pub start: StartCorner,
    /// Infill raster direction.
    #[serde(default)]
    pub infill_angle: InfillAngle,
    /// Print a perimeter around surface infill.
    #[serde(default)]
    pub perimeter: bool,
    /// Fraction of a trace width the infill overlaps the perimeter.
    #[serde(default = "default_overlap_factor")]
    pub overlap_factor: f64,
    /// Print feedrate multiplier.
    #[serde(default = "default_factor")]
    pub speed_factor: f64,
    /// Extrusion multiplier.
    #[serde(default = "default_factor")]
    pub extrude_factor: f64,
}

/// A resolved region with absolute position and dimensions.
#[derive(Debug, Clone)]
pub struct Region {
    /// Unique name.
    pub name: String,
    /// Comment heading used in emitted G-code.
    pub heading: String,
    /// Absolute lower-left corner (mm).
    pub position: Point2,
    /// Width and height (mm).
    pub dimensions: Vec2,
    /// Vertical placement.
    pub placement: LayerRef,
    /// What to print.
    pub kind: RegionKind,
    /// Material this region is printed with.
    pub material: String,
    /// Pattern start corner.
    pub start: StartCorner,
    /// Infill raster direction.
    pub infill_angle: InfillAngle,
    /// Print a perimeter around surface infill.
    pub perimeter: bool,
    /// Fraction of a trace width the infill overlaps the perimeter.
    pub overlap_factor: f64,
    /// Print feedrate multiplier.
    pub speed_factor: f64,
    /// Extrusion multiplier.
    pub extrude_factor: f64,
}

impl Region {
    /// The region's rectangle on the build surface.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.dimensions)
    }
}

/// Overall xy extents of the laid-out regions (mm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintLimits {
    /// Smallest X reached.
    pub x_min: f64,
    /// Largest X reached.
    pub x_max: f64,
    /// Smallest Y reached.
    pub y_min: f64,
    /// Largest Y reached.
    pub y_max: f64,
}

/// Insertion-ordered table of resolved regions.
///
/// Printing order is insertion order; lookups by name serve relative
/// placement and callers picking out single regions.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    origin: Point2,
    regions: Vec<Region>,
    index: HashMap<String, usize>,
}

impl RegionTable {
    /// Empty table whose absolute positions are offsets from `origin`.
    pub fn new(origin: Point2) -> Self {
        Self {
            origin,
            regions: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The table origin.
    pub fn origin(&self) -> Point2 {
        self.origin
    }

    /// Resolve one spec against the regions added so far and add it.
    ///
    /// Dimensions resolve before position: a region placed `left` or
    /// `bottom` of its reference needs its own size to sit flush.
    pub fn add_region(&mut self, spec: RegionSpec) -> Result<&Region> {
        if self.index.contains_key(&spec.name) {
            return Err(ToolpathError::DuplicateRegion(spec.name));
        }

        let dimensions = match &spec.dimensions {
            DimensionSpec::Absolute([w, h]) => Vec2::new(*w, *h),
            DimensionSpec::Relative { relative_to, delta } => {
                let reference = self.lookup(relative_to)?;
                reference.dimensions + Vec2::new(delta[0], delta[1])
            }
        };
        if dimensions.x <= 0.0 || dimensions.y <= 0.0 {
            return Err(ToolpathError::InvalidRegion {
                name: spec.name,
                reason: format!(
                    "resolved dimensions {:.3} x {:.3} mm must be positive",
                    dimensions.x, dimensions.y
                ),
            });
        }

        let position = match &spec.position {
            PositionSpec::Absolute([x, y]) => self.origin + Vec2::new(*x, *y),
            PositionSpec::Relative { relative_to, x, y } => {
                let reference = self.lookup(relative_to)?;
                let px = match x {
                    XPlacement::Edge(XEdge::Left) => reference.position.x - dimensions.x,
                    XPlacement::Edge(XEdge::Right) => {
                        reference.position.x + reference.dimensions.x
                    }
                    XPlacement::Offset(dx) => reference.position.x + dx,
                };
                let py = match y {
                    YPlacement::Edge(YEdge::Bottom) => reference.position.y - dimensions.y,
                    YPlacement::Edge(YEdge::Top) => reference.position.y + reference.dimensions.y,
                    YPlacement::Offset(dy) => reference.position.y + dy,
                };
                Point2::new(px, py)
            }
        };

        let placement = match (spec.layer, spec.z_height) {
            (Some(index), None) => LayerRef::Index(index),
            (None, Some(z)) => LayerRef::Height(z),
            _ => {
                return Err(ToolpathError::InvalidRegion {
                    name: spec.name,
                    reason: "exactly one of layer and z_height must be set".into(),
                })
            }
        };

        let region = Region {
            heading: spec.name.clone(),
            name: spec.name,
            position,
            dimensions,
            placement,
            kind: spec.kind,
            material: spec.material,
            start: spec.start,
            infill_angle: spec.infill_angle,
            perimeter: spec.perimeter,
            overlap_factor: spec.overlap_factor,
            speed_factor: spec.speed_factor,
            extrude_factor: spec.extrude_factor,
        };
        let slot = self.regions.len();
        self.index.insert(region.name.clone(), slot);
        self.regions.push(region);
        Ok(&self.regions[slot])
    }

    /// Look up a region by name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.index.get(name).map(|&slot| &self.regions[slot])
    }

    fn lookup(&self, name: &str) -> Result<&Region> {
        self.get(name)
            .ok_or_else(|| ToolpathError::UnknownRegion(name.to_string()))
    }

    /// Regions in insertion (printing) order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no regions have been added.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Extents of all regions, or `None` for an empty table.
    pub fn bounds(&self) -> Option<PrintLimits> {
        let mut regions = self.regions.iter();
        let first = regions.next()?;
        let mut limits = PrintLimits {
            x_min: first.position.x,
            x_max: first.position.x + first.dimensions.x,
            y_min: first.position.y,
            y_max: first.position.y + first.dimensions.y,
        };
        for region in regions {
            limits.x_min = limits.x_min.min(region.position.x);
            limits.x_max = limits.x_max.max(region.position.x + region.dimensions.x);
            limits.y_min = limits.y_min.min(region.position.y);
            limits.y_max = limits.y_max.max(region.position.y + region.dimensions.y);
        }
        Some(limits)
    }
}
