//! Domain guards
//!
//! Hyperbolic formulas divide by `1 - |p|²` and take square roots of
//! `1 + K|p|²`. A point on or outside the unit ball is therefore an
//! invariant violation: it fails loudly in debug builds and is pulled back
//! inside the ball in release builds.

use crate::curvature::Curvature;
use crate::error::{Result, WarpError};
use crate::scalar::{Real, real};
use nalgebra::Vector3;
use tracing::warn;

/// Largest Poincaré norm a clamped point is allowed to keep
pub const MAX_BALL_NORM: f64 = 1.0 - 1e-5;

/// Check that `p` is inside the model's domain
pub fn check_in_ball<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Result<()> {
    ensure_finite(p, "point")?;
    if curv.is_hyperbolic() {
        let norm = p.norm();
        if norm >= T::one() {
            return Err(WarpError::OutsideDomain {
                norm: nalgebra::try_convert(norm).unwrap_or(f64::NAN),
            });
        }
    }
    Ok(())
}

/// Pull `p` back inside the hyperbolic ball
pub fn clamp_to_ball<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
    if !curv.is_hyperbolic() {
        return *p;
    }
    let max: T = real(MAX_BALL_NORM);
    let norm = p.norm();
    if norm > max { p * (max / norm) } else { *p }
}

/// Debug-assert that `p` is in the domain, clamping it in release builds
pub fn guard_in_ball<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
    match check_in_ball(curv, p) {
        Ok(()) => *p,
        Err(e) => {
            debug_assert!(false, "{e}");
            warn!(error = %e, "Clamping point back into the Poincaré ball");
            clamp_to_ball(curv, p)
        }
    }
}

/// Fail on NaN or infinite components
pub fn ensure_finite<T: Real>(v: &Vector3<T>, context: &'static str) -> Result<()> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(WarpError::NonFinite(context))
    }
}
