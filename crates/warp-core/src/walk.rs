//! Walking the tiling
//!
//! Stepping one cell at a time around a tile vertex closes the loop after
//! `n` steps, but in curved space the walker comes back rotated. The net
//! rotation is the holonomy of the vertex, `(n - 4)` quarter turns about the
//! vertical axis, and it is the most direct observable signature of
//! curvature.
//!
//! ```text
//!    n = 5 (hyperbolic)            n = 3 (spherical)
//!    up, right, down, left, up     up, right, down
//!    → home, turned +90°           → home, turned -90°
//! ```

use crate::curvature::Curvature;
use crate::gyrovector::GyroVector;
use crate::scalar::{Real, real};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single move to the neighbouring cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// +z
    Up,
    /// +x
    Right,
    /// -z
    Down,
    /// -x
    Left,
}

impl Step {
    /// Steps in walking order around a vertex
    pub const CYCLE: [Step; 4] = [Step::Up, Step::Right, Step::Down, Step::Left];

    /// Flat displacement of one cell
    pub fn delta<T: Real>(self, curv: &Curvature) -> Vector3<T> {
        let w: T = curv.cell_width();
        match self {
            Step::Up => Vector3::new(T::zero(), T::zero(), w),
            Step::Right => Vector3::new(w, T::zero(), T::zero()),
            Step::Down => Vector3::new(T::zero(), T::zero(), -w),
            Step::Left => Vector3::new(-w, T::zero(), T::zero()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Up => "up",
            Step::Right => "right",
            Step::Down => "down",
            Step::Left => "left",
        };
        f.pad(name)
    }
}

/// Apply a sequence of steps, one cell each, starting from `start`
pub fn walk<T: Real>(curv: &Curvature, start: &GyroVector<T>, steps: &[Step]) -> GyroVector<T> {
    steps
        .iter()
        .fold(*start, |gv, step| gv.translate(curv, &step.delta(curv)))
}

/// The steps that circle one tile vertex
pub fn vertex_loop(curv: &Curvature) -> Vec<Step> {
    Step::CYCLE.iter().copied().cycle().take(curv.n() as usize).collect()
}

/// Walk once around a tile vertex from the origin
pub fn vertex_walk<T: Real>(curv: &Curvature) -> GyroVector<T> {
    walk(curv, &GyroVector::identity(), &vertex_loop(curv))
}

/// Net rotation expected after [`vertex_walk`]
pub fn expected_holonomy<T: Real>(curv: &Curvature) -> UnitQuaternion<T> {
    let quarter_turns = real::<T>(curv.n() as f64 - 4.0);
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), quarter_turns * T::frac_pi_2())
}
