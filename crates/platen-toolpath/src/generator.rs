//! Toolpath generation.
//!
//! [`ToolpathGenerator`] binds one material's printing parameters to a
//! nozzle state and emits G-code blocks: motion primitives, printed
//! segments and polylines, rectangular regions, and multi-layer
//! cuboids. Methods return [`Gcode`] blocks for the caller to splice;
//! the nozzle state advances as a side effect.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use platen_math::{Point2, Point3, Rect};

use crate::error::{Result, ToolpathError};
use crate::flow;
use crate::gcode::Gcode;
use crate::layout::{Region, RegionKind};
use crate::params::PrintingParameters;
use crate::pattern::{infill_points, perimeter_loop, InfillAngle, StartCorner};
use crate::state::NozzleState;

/// Z descent and lift run at this fraction of the travel feedrate.
const VERTICAL_FACTOR: f64 = 0.2;

/// Generates G-code for one material.
#[derive(Debug, Clone)]
pub struct ToolpathGenerator {
    params: PrintingParameters,
    // Feedrates in mm/min, converted once from the mm/s parameters.
    move_feedrate: f64,
    print_feedrate: f64,
    retract_feedrate: f64,
    wipe_feedrate: f64,
    state: NozzleState,
}

impl ToolpathGenerator {
    /// Build a generator from validated parameters.
    ///
    /// Soft constraint violations are logged and generation proceeds;
    /// hard violations are returned as errors.
    pub fn new(params: PrintingParameters) -> Result<Self> {
        let warnings = params.validate()?;
        for warning in &warnings {
            warn!("{warning}");
        }
        Ok(Self {
            move_feedrate: params.move_feedrate * 60.0,
            print_feedrate: params.print_feedrate * 60.0,
            retract_feedrate: params.retract_feedrate * 60.0,
            wipe_feedrate: params.wipe_feedrate * 60.0,
            state: NozzleState::new(),
            params,
        })
    }

    /// The parameters this generator was built from.
    pub fn params(&self) -> &PrintingParameters {
        &self.params
    }

    /// Current nozzle state.
    pub fn state(&self) -> &NozzleState {
        &self.state
    }

    /// Discard position, retraction, and history, as after re-homing.
    pub fn reset_state(&mut self) {
        self.state = NozzleState::new();
    }

    /// Filament length for a trace of `trace_length` mm at the
    /// configured cross-section and multiplier.
    pub fn extrusion_length(&self, trace_length: f64) -> f64 {
        flow::extrusion_length(
            trace_length,
            self.params.trace_width,
            self.params.layer_height,
            self.params.filament_diameter,
            self.params.extrude_factor,
        )
    }

    /// Travel move without extrusion.
    ///
    /// Warns when traveling with filament engaged while the configured
    /// multiplier would extrude: that drags an oozing nozzle across
    /// the part.
    pub fn rapid_move(
        &mut self,
        target: Point2,
        z: f64,
        speed_factor: f64,
        comment: Option<&str>,
    ) -> Gcode {
        if !self.state.is_retracted() && self.params.extrude_factor != 0.0 {
            warn!(x = target.x, y = target.y, "travel move with filament engaged");
        }
        let comment = comment.unwrap_or("move to point");
        let mut block = Gcode::new();
        block.push_line(&format!(
            "G0 X{:.3} Y{:.3} Z{:.3} E0.0 F{:.0} ; {}",
            target.x,
            target.y,
            z,
            self.move_feedrate * speed_factor,
            comment
        ));
        self.state.record_visit(target.x, target.y, z);
        block
    }

    /// Move over a print point at travel speed, then descend onto it
    /// at reduced speed.
    pub fn approach(&mut self, target: Point3) -> Gcode {
        let xy = Point2::new(target.x, target.y);
        let mut block = self.rapid_move(
            xy,
            target.z + self.params.nozzle_lift,
            1.0,
            Some("move over print point"),
        );
        block.extend(&self.rapid_move(xy, target.z, VERTICAL_FACTOR, Some("lower Z")));
        block
    }

    /// Lift off the current point by the configured nozzle lift.
    pub fn lift(&mut self) -> Gcode {
        let position = self.state.position();
        let z = self.state.z() + self.params.nozzle_lift;
        self.rapid_move(position, z, VERTICAL_FACTOR, Some("lift Z"))
    }

    /// Pull filament back before travel.
    pub fn retract(&mut self) -> Result<Gcode> {
        if self.state.is_retracted() {
            return Err(ToolpathError::DoubleRetract);
        }
        let mut block = Gcode::new();
        block.push_line(&format!(
            "G1 E{:.5} F{:.0} ; retract",
            -self.params.retract_length,
            self.retract_feedrate
        ));
        self.state.set_retracted(true);
        Ok(block)
    }

    /// Push filament back to the nozzle tip before printing.
    pub fn unretract(&mut self) -> Result<Gcode> {
        if !self.state.is_retracted() {
            return Err(ToolpathError::DoubleUnretract);
        }
        let mut block = Gcode::new();
        block.push_line(&format!(
            "G1 E{:.5} F{:.0} ; unretract",
            self.params.retract_length, self.retract_feedrate
        ));
        self.state.set_retracted(false);
        Ok(block)
    }

    /// Two wipe strokes along `angle` (radians): out and back.
    ///
    /// Net-zero motion; the nozzle ends where it started, so the
    /// strokes are not recorded in the history.
    pub fn wipe(&self, angle: f64) -> Gcode {
        let from = self.state.position();
        let out = Point2::new(
            from.x + self.params.wipe_length * angle.cos(),
            from.y + self.params.wipe_length * angle.sin(),
        );
        let mut block = Gcode::new();
        block.push_line(&format!(
            "G1 X{:.3} Y{:.3} F{:.0} ; wipe 1",
            out.x, out.y, self.wipe_feedrate
        ));
        block.push_line(&format!(
            "G1 X{:.3} Y{:.3} F{:.0} ; wipe 2",
            from.x, from.y, self.wipe_feedrate
        ));
        block
    }

    /// Print a connected sequence of segments at height `z`.
    ///
    /// Approaches the first point, runs one retract cycle around the
    /// whole path, wipes along the final segment's direction, and
    /// lifts off the last point. `extrude_factor` and `speed_factor`
    /// scale the configured extrusion and print feedrate for this path
    /// only.
    pub fn print_polyline(
        &mut self,
        points: &[Point2],
        z: f64,
        extrude_factor: f64,
        speed_factor: f64,
        comment: Option<&str>,
    ) -> Result<Gcode> {
        if points.len() < 2 {
            return Err(ToolpathError::PathTooShort(points.len()));
        }
        let comment = comment.unwrap_or("connected line");
        // A zero configured multiplier is a dry calibration run: no
        // filament is engaged, so the retract cycle is skipped whole.
        let dry_run = self.params.extrude_factor == 0.0;

        let first = points[0];
        let mut block = self.approach(Point3::new(first.x, first.y, z));
        if !dry_run {
            block.extend(&self.unretract()?);
        }
        let feedrate = self.print_feedrate * speed_factor;
        for pair in points.windows(2) {
            let length = (pair[1] - pair[0]).norm();
            let e = self.extrusion_length(length) * extrude_factor;
            block.push_line(&format!(
                "G1 X{:.3} Y{:.3} E{:.5} F{:.0} ; {}",
                pair[1].x, pair[1].y, e, feedrate, comment
            ));
            self.state.record_visit(pair[1].x, pair[1].y, z);
        }
        if !dry_run {
            block.extend(&self.retract()?);
            let last = points[points.len() - 1];
            let before = points[points.len() - 2];
            let angle = (before.y - last.y).atan2(before.x - last.x);
            block.extend(&self.wipe(angle));
        }
        block.extend(&self.lift());
        Ok(block)
    }

    /// Print a single straight segment at height `z`.
    pub fn print_segment(
        &mut self,
        from: Point2,
        to: Point2,
        z: f64,
        extrude_factor: f64,
        speed_factor: f64,
        comment: Option<&str>,
    ) -> Result<Gcode> {
        self.print_polyline(
            &[from, to],
            z,
            extrude_factor,
            speed_factor,
            Some(comment.unwrap_or("single line")),
        )
    }

    /// Print a straight segment between two points in space.
    ///
    /// Extrusion follows the full three-axis length. There is no
    /// retract cycle and no lift; this is for bridging between
    /// features at different heights.
    pub fn print_segment_3d(
        &mut self,
        from: Point3,
        to: Point3,
        extrude_factor: f64,
        speed_factor: f64,
        comment: Option<&str>,
    ) -> Gcode {
        let comment = comment.unwrap_or("single line");
        let mut block = self.approach(from);
        let length = (to - from).norm();
        let e = self.extrusion_length(length) * extrude_factor;
        block.push_line(&format!(
            "G1 X{:.3} Y{:.3} Z{:.3} E{:.5} F{:.0} ; {}",
            to.x,
            to.y,
            to.z,
            e,
            self.print_feedrate * speed_factor,
            comment
        ));
        self.state.record_visit(to.x, to.y, to.z);
        block
    }

    /// Print a closed rectangular perimeter inset half a trace width
    /// inside `surface`.
    pub fn print_perimeter(
        &mut self,
        surface: Rect,
        z: f64,
        start: StartCorner,
        speed_factor: f64,
        extrude_factor: f64,
        comment: Option<&str>,
    ) -> Result<Gcode> {
        let points = perimeter_loop(surface, self.params.trace_width, start)?;
        self.print_polyline(
            &points,
            z,
            extrude_factor,
            speed_factor,
            Some(comment.unwrap_or("unnamed perimeter")),
        )
    }

    /// Print a rectangular surface: optional perimeter first, then
    /// boustrophedon infill covering it in one connected path.
    pub fn print_surface(
        &mut self,
        surface: Rect,
        z: f64,
        options: &SurfaceOptions,
        comment: Option<&str>,
    ) -> Result<Gcode> {
        let label = comment.unwrap_or("unnamed surface");
        let mut block = Gcode::new();
        let infill_area = if options.perimeter {
            block.extend(&self.print_perimeter(
                surface,
                z,
                options.start,
                options.speed_factor,
                options.extrude_factor,
                Some(&format!("{label} - perimeter")),
            )?);
            // Pull the infill in by a full trace width, less the
            // requested overlap onto the perimeter.
            surface.inset(self.params.trace_width * (1.0 - options.overlap_factor))
        } else {
            surface
        };
        let points = infill_points(
            infill_area,
            options.infill_angle,
            options.start,
            self.params.trace_width,
            self.params.trace_spacing,
        )?;
        block.extend(&self.print_polyline(
            &points,
            z,
            options.extrude_factor,
            options.speed_factor,
            Some(&format!("{label} - infill")),
        )?);
        Ok(block)
    }

    /// Print one resolved region, with per-call overrides on top of
    /// its stored settings.
    pub fn print_region(&mut self, region: &Region, overrides: &RegionOverrides) -> Result<Gcode> {
        let z = overrides
            .z_height
            .unwrap_or_else(|| region.placement.z_for(self.params.layer_height));
        let surface = region.rect();
        let start = overrides.start.unwrap_or(region.start);
        let speed_factor = overrides.speed_factor.unwrap_or(region.speed_factor);
        let extrude_factor = overrides.extrude_factor.unwrap_or(region.extrude_factor);
        debug!(region = %region.name, z, "printing region");
        match region.kind {
            RegionKind::Surface => {
                let options = SurfaceOptions {
                    infill_angle: overrides.infill_angle.unwrap_or(region.infill_angle),
                    start,
                    perimeter: overrides.perimeter.unwrap_or(region.perimeter),
                    overlap_factor: overrides.overlap_factor.unwrap_or(region.overlap_factor),
                    speed_factor,
                    extrude_factor,
                };
                self.print_surface(surface, z, &options, Some(&region.heading))
            }
            RegionKind::Perimeter => self.print_perimeter(
                surface,
                z,
                start,
                speed_factor,
                extrude_factor,
                Some(&region.heading),
            ),
        }
    }

    /// Print a solid cuboid as stacked surface layers.
    ///
    /// The layer count is `height / layer_height` rounded to nearest.
    /// Infill direction alternates 0/90 degrees and the start corner
    /// alternates lower-left/upper-right by layer parity, so no two
    /// adjacent layers start or raster the same way. Every `skirts`
    /// rectangle is printed as a perimeter on each layer before the
    /// surface. Layer 0 slows the surface to 70% and over-extrudes by
    /// 5% for adhesion; later layers keep the caller's factors.
    #[allow(clippy::too_many_arguments)]
    pub fn print_cuboid(
        &mut self,
        surface: Rect,
        z_start: f64,
        height: f64,
        skirts: &[Rect],
        perimeter: bool,
        speed_factor: f64,
        extrude_factor: f64,
        comment: Option<&str>,
    ) -> Result<CuboidLayers> {
        let layer_height = self.params.layer_height;
        let layer_count = (height / layer_height).round() as i64;
        if layer_count < 1 {
            return Err(ToolpathError::NoLayers {
                height,
                layer_height,
            });
        }
        let label = comment.unwrap_or("unnamed cuboid");
        debug!(label, layer_count, "printing cuboid");

        let mut blocks = BTreeMap::new();
        for layer in 0..layer_count {
            let z = z_start + layer as f64 * layer_height;
            let mut block = Gcode::new();

            let (skirt_speed, skirt_extrude) = if layer == 0 { (0.8, 1.0) } else { (0.7, 1.2) };
            for (i, skirt) in skirts.iter().enumerate() {
                block.extend(&self.print_perimeter(
                    *skirt,
                    z,
                    StartCorner::LowerLeft,
                    skirt_speed,
                    skirt_extrude,
                    Some(&format!("skirt_{i}")),
                )?);
            }

            let (surface_speed, surface_extrude) = if layer == 0 {
                (speed_factor * 0.7, extrude_factor * 1.05)
            } else {
                (speed_factor, extrude_factor)
            };
            let even = layer % 2 == 0;
            let options = SurfaceOptions {
                infill_angle: if even {
                    InfillAngle::Zero
                } else {
                    InfillAngle::Ninety
                },
                start: if even {
                    StartCorner::LowerLeft
                } else {
                    StartCorner::UpperRight
                },
                perimeter,
                speed_factor: surface_speed,
                extrude_factor: surface_extrude,
                ..SurfaceOptions::default()
            };
            block.extend(&self.print_surface(surface, z, &options, Some(label))?);
            blocks.insert(ZKey::from_mm(z), block);
        }

        let top = z_start + (layer_count - 1) as f64 * layer_height;
        Ok(CuboidLayers {
            blocks,
            final_z: ZKey::from_mm(top).mm(),
        })
    }
}

/// Options for printing a filled surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceOptions {
    /// Raster direction of the infill.
    pub infill_angle: InfillAngle,
    /// Corner where the pattern starts.
    pub start: StartCorner,
    /// Print a perimeter before the infill.
    pub perimeter: bool,
    /// Fraction of a trace width the infill overlaps the perimeter.
    pub overlap_factor: f64,
    /// Print feedrate multiplier for this surface.
    pub speed_factor: f64,
    /// Extrusion multiplier for this surface.
    pub extrude_factor: f64,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            infill_angle: InfillAngle::Zero,
            start: StartCorner::LowerLeft,
            perimeter: false,
            overlap_factor: 0.25,
            speed_factor: 1.0,
            extrude_factor: 1.0,
        }
    }
}

/// Per-call overrides applied on top of a region's stored settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionOverrides {
    /// Replace the stored start corner.
    pub start: Option<StartCorner>,
    /// Replace the stored infill angle.
    pub infill_angle: Option<InfillAngle>,
    /// Replace the stored perimeter switch.
    pub perimeter: Option<bool>,
    /// Replace the stored overlap factor.
    pub overlap_factor: Option<f64>,
    /// Replace the stored speed factor.
    pub speed_factor: Option<f64>,
    /// Replace the stored extrusion factor.
    pub extrude_factor: Option<f64>,
    /// Print at this absolute Z instead of the region's own placement.
    pub z_height: Option<f64>,
}

/// Layer key: height in hundredths of a millimetre.
///
/// Heights are rounded to 0.01 mm so the per-layer map has exact,
/// ordered keys instead of raw floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZKey(i64);

impl ZKey {
    /// Key for a height in mm.
    pub fn from_mm(z: f64) -> Self {
        Self((z * 100.0).round() as i64)
    }

    /// The height in mm.
    pub fn mm(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// A cuboid's layers keyed by height, bottom to top, plus the Z the
/// next feature continues from.
#[derive(Debug)]
pub struct CuboidLayers {
    /// Per-layer G-code blocks.
    pub blocks: BTreeMap<ZKey, Gcode>,
    /// Height of the top layer (mm).
    pub final_z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayerRef;
    use approx::assert_relative_eq;
    use platen_math::Vec2;

    fn generator() -> ToolpathGenerator {
        ToolpathGenerator::new(PrintingParameters::default()).unwrap()
    }

    fn surface_20x20() -> Rect {
        Rect::from_origin_size(Point2::new(10.0, 10.0), Vec2::new(20.0, 20.0))
    }

    /// E word of a G1 print line.
    fn e_value(line: &str) -> f64 {
        line.split_whitespace()
            .find(|w| w.starts_with('E'))
            .and_then(|w| w[1..].parse().ok())
            .unwrap()
    }

    fn xy_values(line: &str) -> (f64, f64) {
        let x = line
            .split_whitespace()
            .find(|w| w.starts_with('X'))
            .and_then(|w| w[1..].parse().ok())
            .unwrap();
        let y = line
            .split_whitespace()
            .find(|w| w.starts_with('Y'))
            .and_then(|w| w[1..].parse().ok())
            .unwrap();
        (x, y)
    }

    #[test]
    fn test_feedrates_convert_to_mm_per_min_once() {
        let mut g = generator();
        let block = g.rapid_move(Point2::new(1.0, 2.0), 0.5, 1.0, None);
        // 150 mm/s -> 9000 mm/min.
        assert_eq!(
            block.as_str(),
            "G0 X1.000 Y2.000 Z0.500 E0.0 F9000 ; move to point\n"
        );
    }

    #[test]
    fn test_approach_descends_at_reduced_speed() {
        let mut g = generator();
        let block = g.approach(Point3::new(5.0, 6.0, 0.2));
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(
            lines[0],
            "G0 X5.000 Y6.000 Z1.200 E0.0 F9000 ; move over print point"
        );
        assert_eq!(lines[1], "G0 X5.000 Y6.000 Z0.200 E0.0 F1800 ; lower Z");
        assert_eq!(g.state().history().len(), 2);
    }

    #[test]
    fn test_retract_cycle_stays_balanced() {
        let mut g = generator();
        // Fresh state is retracted: retracting again is an error.
        assert!(matches!(g.retract(), Err(ToolpathError::DoubleRetract)));

        let unretract = g.unretract().unwrap();
        assert_eq!(unretract.as_str(), "G1 E1.20000 F2100 ; unretract\n");
        assert!(!g.state().is_retracted());
        assert!(matches!(g.unretract(), Err(ToolpathError::DoubleUnretract)));

        let retract = g.retract().unwrap();
        assert_eq!(retract.as_str(), "G1 E-1.20000 F2100 ; retract\n");
        assert!(g.state().is_retracted());
    }

    #[test]
    fn test_wipe_strokes_return_to_start() {
        let mut g = generator();
        g.rapid_move(Point2::new(10.0, 10.0), 0.2, 1.0, None);
        let block = g.wipe(0.0);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "G1 X12.000 Y10.000 F1200 ; wipe 1");
        assert_eq!(lines[1], "G1 X10.000 Y10.000 F1200 ; wipe 2");
        // Wipe is net-zero and unrecorded.
        assert_eq!(g.state().position(), Point2::new(10.0, 10.0));
        assert_eq!(g.state().history().len(), 1);
    }

    #[test]
    fn test_segment_emits_full_print_cycle() {
        let mut g = generator();
        let block = g
            .print_segment(
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                0.2,
                1.0,
                1.0,
                None,
            )
            .unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].ends_with("; move over print point"));
        assert!(lines[1].ends_with("; lower Z"));
        assert!(lines[2].ends_with("; unretract"));
        assert!(lines[3].contains("; single line"));
        assert!(lines[4].ends_with("; retract"));
        assert!(lines[5].ends_with("; wipe 1"));
        assert!(lines[6].ends_with("; wipe 2"));
        assert!(lines[7].ends_with("; lift Z"));

        // Print feedrate 40 mm/s -> 2400 mm/min; extrusion follows the
        // rounded-rectangle model for 10 mm of travel.
        let expected = format!(
            "G1 X10.000 Y0.000 E{:.5} F2400 ; single line",
            g.extrusion_length(10.0)
        );
        assert_eq!(lines[3], expected);
        // Wipe runs opposite the final segment direction.
        assert!(lines[5].starts_with("G1 X8.000 Y0.000"));
        assert!(g.state().is_retracted());
    }

    #[test]
    fn test_polyline_needs_two_points() {
        let mut g = generator();
        assert!(matches!(
            g.print_polyline(&[Point2::new(1.0, 1.0)], 0.2, 1.0, 1.0, None),
            Err(ToolpathError::PathTooShort(1))
        ));
    }

    #[test]
    fn test_zero_multiplier_suppresses_retract_cycle() {
        let params = PrintingParameters {
            extrude_factor: 0.0,
            ..Default::default()
        };
        let mut g = ToolpathGenerator::new(params).unwrap();
        let block = g
            .print_polyline(
                &[Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)],
                0.2,
                1.0,
                1.0,
                None,
            )
            .unwrap();
        let text = block.as_str();
        assert!(!text.contains("retract"));
        assert!(!text.contains("wipe"));
        assert!(text.contains("move over print point"));
        assert!(text.contains("lift Z"));
        // No filament moves at all.
        for line in block.lines().filter(|l| l.starts_with("G1")) {
            assert_eq!(e_value(line), 0.0);
        }
        assert!(g.state().is_retracted());
    }

    #[test]
    fn test_infill_extrusion_tracks_trace_length() {
        let mut g = generator();
        let block = g
            .print_surface(surface_20x20(), 0.2, &SurfaceOptions::default(), None)
            .unwrap();
        let span = g.extrusion_length(20.0 - 0.4);
        let step = g.extrusion_length(0.45);
        let mut span_count = 0;
        for line in block.lines().filter(|l| l.contains("- infill")) {
            let e = e_value(line);
            let matches_span = (e - span).abs() < 1e-6;
            let matches_step = (e - step).abs() < 1e-6;
            assert!(matches_span || matches_step, "unexpected E in {line}");
            if matches_span {
                span_count += 1;
            }
        }
        assert!(span_count > 10);
    }

    #[test]
    fn test_perimeter_loop_returns_to_start() {
        let mut g = generator();
        g.print_perimeter(
            surface_20x20(),
            0.2,
            StartCorner::LowerLeft,
            1.0,
            1.0,
            None,
        )
        .unwrap();
        let history = g.state().history();
        // over, start, three corners, closing point, lift.
        assert_eq!(history.len(), 7);
        assert_eq!(history[1], history[5]);
        assert_relative_eq!(history[1].x, 10.2, epsilon = 1e-12);
        assert_relative_eq!(history[1].y, 10.2, epsilon = 1e-12);
    }

    #[test]
    fn test_surface_with_perimeter_shrinks_infill() {
        let mut g = generator();
        let options = SurfaceOptions {
            perimeter: true,
            ..Default::default()
        };
        let block = g
            .print_surface(surface_20x20(), 0.2, &options, Some("pad"))
            .unwrap();
        assert!(block.as_str().contains("; pad - perimeter"));
        assert!(block.as_str().contains("; pad - infill"));
        // Infill stays inside the perimeter-adjusted area: inset by
        // 0.4 * (1 - 0.25) = 0.3 per side, plus half a width.
        for line in block.lines().filter(|l| l.contains("- infill")) {
            let (x, _) = xy_values(line);
            assert!(x >= 10.3 + 0.2 - 1e-9);
            assert!(x <= 30.0 - 0.3 - 0.2 + 1e-9);
        }
    }

    #[test]
    fn test_segment_3d_has_no_retract_cycle() {
        let mut g = generator();
        let block = g.print_segment_3d(
            Point3::new(0.0, 0.0, 0.2),
            Point3::new(3.0, 0.0, 4.2),
            1.0,
            1.0,
            Some("bridge"),
        );
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(!block.as_str().contains("retract"));
        // Extrusion follows the 3-D length: sqrt(3^2 + 4^2) = 5.
        let expected = format!(
            "G1 X3.000 Y0.000 Z4.200 E{:.5} F2400 ; bridge",
            g.extrusion_length(5.0)
        );
        assert_eq!(lines[2], expected);
    }

    #[test]
    fn test_cuboid_alternates_angle_and_corner() {
        let mut g = generator();
        let layers = g
            .print_cuboid(surface_20x20(), 0.2, 0.6, &[], false, 1.0, 1.0, Some("block"))
            .unwrap();
        assert_eq!(layers.blocks.len(), 3);
        let keys: Vec<f64> = layers.blocks.keys().map(|k| k.mm()).collect();
        assert_eq!(keys, vec![0.2, 0.4, 0.6]);
        assert_relative_eq!(layers.final_z, 0.6, epsilon = 1e-12);

        for (i, block) in layers.blocks.values().enumerate() {
            let approach = block
                .lines()
                .find(|l| l.ends_with("; move over print point"))
                .unwrap();
            let first_fill = block.lines().find(|l| l.contains("- infill")).unwrap();
            let (ax, ay) = xy_values(approach);
            let (fx, fy) = xy_values(first_fill);
            if i % 2 == 0 {
                // Lines along X from the lower-left corner.
                assert_relative_eq!(ay, fy, epsilon = 1e-9);
                assert!(fx > ax);
            } else {
                // Lines along Y from the upper-right corner.
                assert_relative_eq!(ax, fx, epsilon = 1e-9);
                assert!(fy < ay);
            }
        }
    }

    #[test]
    fn test_cuboid_first_layer_factors() {
        let mut g = generator();
        let skirt = Rect::from_origin_size(Point2::new(5.0, 5.0), Vec2::new(30.0, 30.0));
        let layers = g
            .print_cuboid(
                surface_20x20(),
                0.2,
                0.4,
                &[skirt],
                false,
                1.0,
                1.0,
                Some("block"),
            )
            .unwrap();
        let blocks: Vec<&Gcode> = layers.blocks.values().collect();

        let skirt_line = |b: &Gcode| {
            b.lines()
                .find(|l| l.starts_with("G1 X") && l.contains("; skirt_0"))
                .unwrap()
                .to_string()
        };
        let fill_line = |b: &Gcode| {
            b.lines()
                .find(|l| l.contains("- infill"))
                .unwrap()
                .to_string()
        };
        // Layer 0: skirt at 80% of 2400, surface at 70%.
        assert!(skirt_line(blocks[0]).contains("F1920"));
        assert!(fill_line(blocks[0]).contains("F1680"));
        // Layer 1: skirt at 70%, surface back at the caller's factor.
        assert!(skirt_line(blocks[1]).contains("F1680"));
        assert!(fill_line(blocks[1]).contains("F2400"));

        // Layer 0 over-extrudes the surface by 5%.
        let e0 = e_value(&fill_line(blocks[0]));
        let e1 = e_value(&fill_line(blocks[1]));
        let expected0 = g.extrusion_length(20.0 - 0.4) * 1.05;
        let expected1 = g.extrusion_length(20.0 - 0.4);
        assert!((e0 - expected0).abs() < 1e-4);
        assert!((e1 - expected1).abs() < 1e-4);
    }

    #[test]
    fn test_cuboid_rejects_zero_layers() {
        let mut g = generator();
        assert!(matches!(
            g.print_cuboid(surface_20x20(), 0.2, 0.05, &[], false, 1.0, 1.0, None),
            Err(ToolpathError::NoLayers { .. })
        ));
    }

    #[test]
    fn test_region_overrides_replace_stored_settings() {
        let mut g = generator();
        let region = Region {
            name: "pad".into(),
            heading: "pad".into(),
            position: Point2::new(10.0, 10.0),
            dimensions: Vec2::new(20.0, 20.0),
            placement: LayerRef::Index(3),
            kind: RegionKind::Surface,
            material: "pla".into(),
            start: StartCorner::LowerLeft,
            infill_angle: InfillAngle::Zero,
            perimeter: false,
            overlap_factor: 0.25,
            speed_factor: 1.0,
            extrude_factor: 1.0,
        };

        // Stored placement: layer 3 at 0.2 mm layers.
        let block = g.print_region(&region, &RegionOverrides::default()).unwrap();
        assert!(block.as_str().contains("Z0.600 E0.0 F1800 ; lower Z"));
        assert!(block.as_str().contains("; pad - infill"));

        let overridden = g
            .print_region(
                &region,
                &RegionOverrides {
                    z_height: Some(1.5),
                    speed_factor: Some(0.5),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(overridden.as_str().contains("Z1.500 E0.0 F1800 ; lower Z"));
        assert!(overridden.as_str().contains("F1200 ; pad - infill"));
    }
}
