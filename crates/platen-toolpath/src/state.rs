//! Nozzle state tracking.
//!
//! One [`NozzleState`] lives inside each generator and is the single
//! source of truth for where the nozzle is and whether filament is
//! retracted. Motion primitives update it as a side effect of emitting
//! G-code; nothing else writes to it.

use platen_math::{Point2, Point3};

/// Current nozzle position and retraction state, plus an append-only
/// history of every visited point for auditing.
#[derive(Debug, Clone)]
pub struct NozzleState {
    position: Point2,
    z: f64,
    retracted: bool,
    history: Vec<Point3>,
}

impl NozzleState {
    /// Fresh state at the machine origin.
    ///
    /// Starts retracted: the prime macro run at tool load leaves the
    /// filament backed off, so the first print cycle's unretract is
    /// balanced.
    pub fn new() -> Self {
        Self {
            position: Point2::origin(),
            z: 0.0,
            retracted: true,
            history: Vec::new(),
        }
    }

    /// Current XY position (mm).
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Current Z height (mm).
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Whether filament is currently retracted.
    pub fn is_retracted(&self) -> bool {
        self.retracted
    }

    /// Every point visited so far, in visit order.
    pub fn history(&self) -> &[Point3] {
        &self.history
    }

    /// The most recently visited point, if any motion has happened.
    pub fn last_visited(&self) -> Option<Point3> {
        self.history.last().copied()
    }

    pub(crate) fn record_visit(&mut self, x: f64, y: f64, z: f64) {
        self.position = Point2::new(x, y);
        self.z = z;
        self.history.push(Point3::new(x, y, z));
    }

    pub(crate) fn set_retracted(&mut self, retracted: bool) {
        self.retracted = retracted;
    }
}

impl Default for NozzleState {
    fn default() -> Self {
        Self::new()
    }
}
