//! Scalar abstraction over single and double precision
//!
//! Per-object composition runs in `f32`; the player's accumulated world
//! transform runs in `f64`. Both go through the same generic code.

use nalgebra::RealField;

/// Floating point type usable by the gyrovector algebra
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Convert an `f64` constant into the working precision
#[inline]
pub fn real<T: Real>(x: f64) -> T {
    nalgebra::convert(x)
}
