//! Möbius addition and gyration
//!
//! Positions in the Poincaré ball do not add like vectors. Translating `a`
//! by `b` is the Möbius sum `a ⊕ b`, which is neither commutative nor
//! associative. The failure of associativity is captured exactly by the
//! gyration `gyr[a, b]`, a rotation:
//!
//! ```text
//!   a ⊕ (b ⊕ x) = (a ⊕ b) ⊕ gyr[a, b] x
//!   a ⊕ b       = gyr[a, b] (b ⊕ a)
//! ```
//!
//! Every formula here is written so that `K = 0` reduces it to ordinary
//! vector algebra.

use crate::curvature::Curvature;
use crate::rotation::normalize_or_zero;
use crate::scalar::{Real, real};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Shared intermediates of `a ⊕ b`
#[inline]
fn terms<T: Real>(k: T, a: &Vector3<T>, b: &Vector3<T>) -> (Vector3<T>, T, Vector3<T>) {
    let c = a.cross(b) * k;
    let d = T::one() - k * a.dot(b);
    let t = a + b;
    let sum = (t * d + c.cross(&t)) / (d * d + c.norm_squared());
    (c, d, sum)
}

/// Möbius addition `a ⊕ b`
pub fn mobius_add<T: Real>(curv: &Curvature, a: &Vector3<T>, b: &Vector3<T>) -> Vector3<T> {
    terms(curv.k(), a, b).2
}

/// Möbius gyration `gyr[a, b]`
///
/// Closed form of the composition of two half turns about `a ⊕ b` and
/// `a + b`. Composing the half turns directly loses precision near the ball
/// boundary.
pub fn mobius_gyr<T: Real>(curv: &Curvature, a: &Vector3<T>, b: &Vector3<T>) -> UnitQuaternion<T> {
    let k: T = curv.k();
    let c = a.cross(b) * k;
    let d = T::one() - k * a.dot(b);
    UnitQuaternion::new_normalize(Quaternion::new(d, c.x, c.y, c.z))
}

/// `a ⊕ b` together with `gyr[b, a]` in one pass
///
/// Note the argument order of the gyration. It is the rotation needed when
/// composing transforms, which is the inverse of `gyr[a, b]`.
pub fn mobius_add_gyr<T: Real>(
    curv: &Curvature,
    a: &Vector3<T>,
    b: &Vector3<T>,
) -> (Vector3<T>, UnitQuaternion<T>) {
    let (c, d, sum) = terms(curv.k(), a, b);
    let gyr = UnitQuaternion::new_normalize(Quaternion::new(d, -c.x, -c.y, -c.z));
    (sum, gyr)
}

/// Squared magnitude of `a ⊕ (-b)` without forming the sum
pub fn mobius_dist_sq<T: Real>(curv: &Curvature, a: &Vector3<T>, b: &Vector3<T>) -> T {
    let k: T = curv.k();
    let a2 = a.norm_squared();
    let b2 = b.norm_squared();
    let ab = a.dot(b) * real(2.0);
    (a2 - ab + b2) / (T::one() + k * (ab + k * a2 * b2))
}

/// Geodesic distance between two Poincaré points
pub fn geodesic_distance<T: Real>(curv: &Curvature, a: &Vector3<T>, b: &Vector3<T>) -> T {
    let d = mobius_dist_sq(curv, a, b).max(T::zero()).sqrt();
    if curv.is_euclidean() {
        d
    } else {
        curv.atan_k(d) * real(2.0)
    }
}

/// Map a flat displacement to a Möbius displacement of the same length
///
/// Displacements shorter than `1e-5` map to zero.
pub fn hyper_translate<T: Real>(curv: &Curvature, d: &Vector3<T>) -> Vector3<T> {
    let mag = d.norm();
    if mag < real(1e-5) {
        return Vector3::zeros();
    }
    d * (curv.tan_k(mag) / mag)
}

/// Ordering-only distance between two Poincaré points
///
/// Monotonic in the true distance, so it is only good for comparisons.
pub fn poincare_dist<T: Real>(curv: &Curvature, a: &Vector3<T>, b: &Vector3<T>) -> T {
    let k: T = curv.k();
    (a - b).norm_squared() / ((k + a.norm_squared()) * (k + b.norm_squared()))
}

/// The local "up" direction at a Poincaré point
///
/// Tangent to the geodesic through `p` that is perpendicular to the ground
/// plane.
pub fn up_vector<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
    let k: T = curv.k();
    let u = T::one() + k * p.norm_squared();
    let v = real::<T>(-2.0) * k * p.y;
    normalize_or_zero(&(Vector3::y() * u + p * v))
}

/// Drop a Poincaré point straight down onto the ground plane
///
/// Equivalent to zeroing the Klein y coordinate.
pub fn project_to_plane<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
    let k: T = curv.k();
    let m = k * p.norm_squared();
    let d = T::one() + m;
    let s = real::<T>(2.0) / (T::one() - m + (d * d - real::<T>(4.0) * k * p.y * p.y).sqrt());
    Vector3::new(p.x * s, T::zero(), p.z * s)
}
