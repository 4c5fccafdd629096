//! Perimeter and infill pattern generation.
//!
//! Pure point-list builders. The generator turns these lists into
//! motion; nothing here touches nozzle state or emits text.

use serde::{Deserialize, Serialize};

use platen_math::{Point2, Rect};

use crate::error::{Result, ToolpathError};

/// Boundary inclusion tolerance for infill stacking (mm).
const STACK_EPS: f64 = 1e-9;

/// Corner of a rectangle where a pattern starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartCorner {
    /// Minimum X, minimum Y.
    #[default]
    LowerLeft,
    /// Maximum X, minimum Y.
    LowerRight,
    /// Minimum X, maximum Y.
    UpperLeft,
    /// Maximum X, maximum Y.
    UpperRight,
}

impl StartCorner {
    /// True for the two corners on the maximum-X side.
    pub fn at_x_max(self) -> bool {
        matches!(self, StartCorner::LowerRight | StartCorner::UpperRight)
    }

    /// True for the two corners on the maximum-Y side.
    pub fn at_y_max(self) -> bool {
        matches!(self, StartCorner::UpperLeft | StartCorner::UpperRight)
    }
}

/// Raster direction of boustrophedon infill.
///
/// Only the two axis-aligned directions exist; anything else in input
/// data is rejected at the boundary instead of being carried around as
/// a raw angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum InfillAngle {
    /// Lines parallel to the X axis.
    #[default]
    Zero,
    /// Lines parallel to the Y axis.
    Ninety,
}

impl InfillAngle {
    /// The angle in degrees.
    pub fn degrees(self) -> f64 {
        match self {
            InfillAngle::Zero => 0.0,
            InfillAngle::Ninety => 90.0,
        }
    }
}

impl TryFrom<f64> for InfillAngle {
    type Error = ToolpathError;

    fn try_from(degrees: f64) -> Result<Self> {
        if degrees == 0.0 {
            Ok(InfillAngle::Zero)
        } else if degrees == 90.0 {
            Ok(InfillAngle::Ninety)
        } else {
            Err(ToolpathError::UnsupportedInfillAngle(degrees))
        }
    }
}

impl From<InfillAngle> for f64 {
    fn from(angle: InfillAngle) -> f64 {
        angle.degrees()
    }
}

/// Closed rectangular perimeter loop inset by half a trace width.
///
/// Five points: the loop starts and ends at `start`, traversing the
/// rectangle counter-clockwise regardless of the chosen corner.
pub fn perimeter_loop(surface: Rect, trace_width: f64, start: StartCorner) -> Result<Vec<Point2>> {
    let inner = surface.inset(trace_width / 2.0);
    if inner.is_degenerate() {
        return Err(ToolpathError::RegionTooSmall(format!(
            "{:.3} x {:.3} mm surface cannot fit a perimeter at trace width {:.3} mm",
            surface.width(),
            surface.height(),
            trace_width
        )));
    }
    let (x0, y0) = (inner.min.x, inner.min.y);
    let (x1, y1) = (inner.max.x, inner.max.y);
    let (xs, ys) = match start {
        StartCorner::LowerLeft => ([x0, x1, x1, x0, x0], [y0, y0, y1, y1, y0]),
        StartCorner::UpperLeft => ([x0, x0, x1, x1, x0], [y1, y0, y0, y1, y1]),
        StartCorner::LowerRight => ([x1, x1, x0, x0, x1], [y0, y1, y1, y0, y0]),
        StartCorner::UpperRight => ([x1, x0, x0, x1, x1], [y1, y1, y0, y0, y1]),
    };
    Ok(xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| Point2::new(x, y))
        .collect())
}

/// Boustrophedon infill points for `surface`.
///
/// Lines run along X for [`InfillAngle::Zero`] and along Y for
/// [`InfillAngle::Ninety`], spaced `trace_spacing` apart and kept
/// `trace_width / 2` clear of every edge. The stack is shifted by half
/// the leftover gap so the margins at both edges match. The first
/// point lands at `start`, and consecutive lines connect at
/// alternating ends so the whole surface is one unbroken path.
pub fn infill_points(
    surface: Rect,
    angle: InfillAngle,
    start: StartCorner,
    trace_width: f64,
    trace_spacing: f64,
) -> Result<Vec<Point2>> {
    let half = trace_width / 2.0;
    let (x0, y0) = (surface.min.x, surface.min.y);
    let (x1, y1) = (surface.max.x, surface.max.y);

    // Span of each printed line and the stack axis depend on the angle;
    // everything else is shared between the two orientations.
    let (span_lo, span_hi, stack_lo, stack_hi) = match angle {
        InfillAngle::Zero => (x0 + half, x1 - half, y0, y1),
        InfillAngle::Ninety => (y0 + half, y1 - half, x0, x1),
    };
    if span_lo >= span_hi {
        return Err(ToolpathError::RegionTooSmall(format!(
            "{:.3} x {:.3} mm surface leaves no room for {} deg infill lines at trace width {:.3} mm",
            surface.width(),
            surface.height(),
            angle.degrees(),
            trace_width
        )));
    }

    let mut stack = stack_positions(stack_lo, stack_hi, half, trace_spacing);
    if stack.is_empty() {
        return Err(ToolpathError::RegionTooSmall(format!(
            "{:.3} x {:.3} mm surface cannot fit one infill line at trace width {:.3} mm",
            surface.width(),
            surface.height(),
            trace_width
        )));
    }

    // Center the stack: split the leftover gap at the far edge evenly
    // between the two edges. The last trace never crosses the far edge.
    let last = stack[stack.len() - 1];
    let correction = stack_hi - (last + half);
    for pos in &mut stack {
        *pos += correction / 2.0;
    }

    let reverse_stack = match angle {
        InfillAngle::Zero => start.at_y_max(),
        InfillAngle::Ninety => start.at_x_max(),
    };
    if reverse_stack {
        stack.reverse();
    }
    let start_at_far = match angle {
        InfillAngle::Zero => start.at_x_max(),
        InfillAngle::Ninety => start.at_y_max(),
    };
    let (a, b) = if start_at_far {
        (span_hi, span_lo)
    } else {
        (span_lo, span_hi)
    };

    let mut points = Vec::with_capacity(stack.len() * 2);
    for (i, &pos) in stack.iter().enumerate() {
        let (first, second) = if i % 2 == 0 { (a, b) } else { (b, a) };
        match angle {
            InfillAngle::Zero => {
                points.push(Point2::new(first, pos));
                points.push(Point2::new(second, pos));
            }
            InfillAngle::Ninety => {
                points.push(Point2::new(pos, first));
                points.push(Point2::new(pos, second));
            }
        }
    }
    Ok(points)
}

/// Line positions along the stack axis, first one at `lo + half`, then
/// every `spacing`, stopping before any trace would cross `hi`.
fn stack_positions(lo: f64, hi: f64, half: f64, spacing: f64) -> Vec<f64> {
    let first = lo + half;
    let limit = hi - half;
    let mut positions = Vec::new();
    let mut k = 0u32;
    loop {
        let pos = first + f64::from(k) * spacing;
        if pos > limit + STACK_EPS {
            break;
        }
        positions.push(pos);
        k += 1;
    }
    positions
}
