//! Vector and rotation helpers
//!
//! Thin additions on top of nalgebra for the handful of operations the
//! gyrovector algebra needs that nalgebra either lacks or defines with a
//! different failure mode (rotation between antiparallel vectors, twist
//! extraction, Euler angles in a yaw-pitch-roll authoring order).

use crate::scalar::{Real, real};
use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};

/// Magnitude below which a vector is treated as zero when normalizing
pub const NORMALIZE_EPSILON: f64 = 1e-5;

/// Normalize, or return zero for vectors too short to have a direction
#[inline]
pub fn normalize_or_zero<T: Real>(v: &Vector3<T>) -> Vector3<T> {
    let mag = v.norm();
    if mag > real(NORMALIZE_EPSILON) {
        v / mag
    } else {
        Vector3::zeros()
    }
}

/// Vector projection of `v` onto `onto`
#[inline]
pub fn project<T: Real>(v: &Vector3<T>, onto: &Vector3<T>) -> Vector3<T> {
    let len_sq = onto.norm_squared();
    if len_sq <= T::default_epsilon() {
        return Vector3::zeros();
    }
    onto * (v.dot(onto) / len_sq)
}

/// Shortest rotation taking direction `from` onto direction `to`
///
/// For antiparallel inputs the result is a half turn about an arbitrary axis
/// perpendicular to `from`.
pub fn from_to_rotation<T: Real>(from: &Vector3<T>, to: &Vector3<T>) -> UnitQuaternion<T> {
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        let mut axis = Vector3::x().cross(from);
        if axis.norm_squared() < real(1e-6) {
            axis = Vector3::y().cross(from);
        }
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), T::pi())
    })
}

/// Twist part of the swing-twist decomposition of `q` about `axis`
///
/// When `q` has no twist component around `axis` at all (a pure half-turn
/// swing) the twist is the identity.
pub fn swing_twist<T: Real>(q: &UnitQuaternion<T>, axis: &Vector3<T>) -> UnitQuaternion<T> {
    let p = project(&q.imag(), axis);
    let twist = Quaternion::new(q.w, p.x, p.y, p.z);
    UnitQuaternion::try_new(twist, T::default_epsilon()).unwrap_or_else(UnitQuaternion::identity)
}

/// Normalized linear interpolation along the shorter arc
pub fn nlerp<T: Real>(a: &UnitQuaternion<T>, b: &UnitQuaternion<T>, t: T) -> UnitQuaternion<T> {
    let qa = *a.quaternion();
    let mut qb = *b.quaternion();
    if qa.dot(&qb) < T::zero() {
        qb = -qb;
    }
    let mixed = qa * (T::one() - t) + qb * t;
    UnitQuaternion::try_new(mixed, T::default_epsilon()).unwrap_or(*a)
}

/// Unclamped spherical interpolation, falling back to [`nlerp`] when the two
/// rotations are half a turn apart
pub fn slerp<T: Real>(a: &UnitQuaternion<T>, b: &UnitQuaternion<T>, t: T) -> UnitQuaternion<T> {
    a.try_slerp(b, t, T::default_epsilon())
        .unwrap_or_else(|| nlerp(a, b, t))
}

/// Rotation from Euler angles in degrees
///
/// Applied roll (z) first, then pitch (x), then yaw (y), the order level
/// authoring tools use.
pub fn euler_degrees<T: Real>(x: T, y: T, z: T) -> UnitQuaternion<T> {
    let to_rad = T::pi() / real(180.0);
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x * to_rad);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y * to_rad);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z * to_rad);
    qy * qx * qz
}

/// Compare two rotations up to the sign of the quaternion
pub fn rotation_eq<T: Real>(a: &UnitQuaternion<T>, b: &UnitQuaternion<T>, tolerance: T) -> bool {
    let qa = a.quaternion();
    let qb = if qa.dot(b.quaternion()) < T::zero() {
        -*b.quaternion()
    } else {
        *b.quaternion()
    };
    (qa.coords - qb.coords).amax() <= tolerance
}
