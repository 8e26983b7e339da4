//! The GyroVector transform
//!
//! A `GyroVector` is the curved-space replacement for a rigid transform: a
//! Poincaré position `vec` and the holonomy rotation `gyr` that travelling
//! there has accumulated.
//!
//! ```text
//!   gv ⊕ delta        translate        move by delta in gv's local frame
//!   delta ⊕ gv        pre_translate    move gv's origin by delta first
//!   gv ⊕ rot          rotate
//!   rot ⊕ gv          pre_rotate
//!   gv1 ⊕ gv2         compose          apply gv1, then gv2
//!   ⊖gv               inverse
//! ```
//!
//! Composition is associative but not commutative. Composing with the
//! identity (or a zero translation) returns the input bit for bit, which is
//! what keeps a stationary world from drifting.

use crate::curvature::Curvature;
use crate::domain::ensure_finite;
use crate::error::WarpError;
use crate::mobius::{mobius_add, mobius_add_gyr, project_to_plane, up_vector};
use crate::rotation::{from_to_rotation, slerp, swing_twist};
use crate::scalar::{Real, real};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Tolerance on `|gyr|` accepted when loading a stored transform
pub const UNIT_ROTATION_TOLERANCE: f64 = 1e-4;

/// Position plus holonomy rotation under Möbius composition
///
/// Loading checks that both parts are finite and that `gyr` is a unit
/// quaternion. Whether `vec` lies inside the Poincaré ball depends on the
/// world's curvature, so that check belongs to whoever knows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GyroVectorRepr<T>")]
#[serde(bound(deserialize = "T: Real + Deserialize<'de>"))]
pub struct GyroVector<T: Real> {
    vec: Vector3<T>,
    gyr: UnitQuaternion<T>,
}

impl<T: Real> GyroVector<T> {
    /// Identity transform
    pub fn identity() -> Self {
        Self {
            vec: Vector3::zeros(),
            gyr: UnitQuaternion::identity(),
        }
    }

    pub fn new(vec: Vector3<T>, gyr: UnitQuaternion<T>) -> Self {
        Self { vec, gyr }
    }

    /// Pure translation
    pub fn from_vec(vec: Vector3<T>) -> Self {
        Self {
            vec,
            gyr: UnitQuaternion::identity(),
        }
    }

    /// Pure rotation
    pub fn from_rotation(gyr: UnitQuaternion<T>) -> Self {
        Self {
            vec: Vector3::zeros(),
            gyr,
        }
    }

    /// Poincaré offset
    pub fn vec(&self) -> &Vector3<T> {
        &self.vec
    }

    /// Holonomy rotation
    pub fn gyr(&self) -> &UnitQuaternion<T> {
        &self.gyr
    }

    /// Same rotation at a different offset
    pub fn with_vec(&self, vec: Vector3<T>) -> Self {
        Self { vec, gyr: self.gyr }
    }

    /// `gv ⊕ delta`: translate by `delta` expressed in this transform's frame
    pub fn translate(&self, curv: &Curvature, delta: &Vector3<T>) -> Self {
        let local = self.gyr.inverse_transform_vector(delta);
        let (vec, g) = mobius_add_gyr(curv, &self.vec, &local);
        Self {
            vec,
            gyr: self.gyr * g,
        }
    }

    /// `gv ⊖ delta`
    pub fn translate_back(&self, curv: &Curvature, delta: &Vector3<T>) -> Self {
        self.translate(curv, &-delta)
    }

    /// `delta ⊕ gv`: translate the origin by `delta` before applying this
    pub fn pre_translate(&self, curv: &Curvature, delta: &Vector3<T>) -> Self {
        let (vec, g) = mobius_add_gyr(curv, delta, &self.vec);
        Self {
            vec,
            gyr: self.gyr * g,
        }
    }

    /// `delta ⊖ gv`
    pub fn pre_translate_back(&self, curv: &Curvature, delta: &Vector3<T>) -> Self {
        self.inverse().pre_translate(curv, delta)
    }

    /// `gv ⊕ rot`
    pub fn rotate(&self, rot: &UnitQuaternion<T>) -> Self {
        Self {
            vec: self.vec,
            gyr: rot * self.gyr,
        }
    }

    /// `gv ⊖ rot`
    pub fn rotate_back(&self, rot: &UnitQuaternion<T>) -> Self {
        self.rotate(&rot.inverse())
    }

    /// `rot ⊕ gv`
    pub fn pre_rotate(&self, rot: &UnitQuaternion<T>) -> Self {
        Self {
            vec: rot.inverse_transform_vector(&self.vec),
            gyr: self.gyr * rot,
        }
    }

    /// `gv ⊕ other`: apply `self`, then `other`
    pub fn compose(&self, curv: &Curvature, other: &Self) -> Self {
        let local = self.gyr.inverse_transform_vector(&other.vec);
        let (vec, g) = mobius_add_gyr(curv, &self.vec, &local);
        Self {
            vec,
            gyr: other.gyr * self.gyr * g,
        }
    }

    /// `gv ⊖ other`
    pub fn difference(&self, curv: &Curvature, other: &Self) -> Self {
        self.compose(curv, &other.inverse())
    }

    /// `⊖gv`
    pub fn inverse(&self) -> Self {
        Self {
            vec: -(self.gyr * self.vec),
            gyr: self.gyr.inverse(),
        }
    }

    /// Transform a point: `gyr · (vec ⊕ p)`
    pub fn apply(&self, curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
        self.gyr * mobius_add(curv, &self.vec, p)
    }

    /// Where this transform takes the origin
    pub fn point(&self) -> Vector3<T> {
        self.gyr * self.vec
    }

    /// Transform a point together with a tangent direction at that point
    pub fn transform_normal(
        &self,
        curv: &Curvature,
        p: &Vector3<T>,
        n: &Vector3<T>,
    ) -> (Vector3<T>, Vector3<T>) {
        let (v, q) = mobius_add_gyr(curv, &self.vec, p);
        (self.gyr * v, self.gyr * q.inverse_transform_vector(n))
    }

    /// Re-derive the rotation so local up matches the true up at `vec`
    ///
    /// Keeps only the twist of the current rotation around the up axis.
    pub fn align_up_vector(&mut self, curv: &Curvature) {
        let axis = up_vector(curv, &self.vec);
        let basis = from_to_rotation(&axis, &Vector3::y());
        let twist = swing_twist(&self.gyr, &axis);
        self.gyr = basis * twist;
    }

    /// Drop the transform onto the ground plane, keeping only its yaw
    pub fn project_to_plane(&self, curv: &Curvature) -> Self {
        let yaw = Quaternion::new(self.gyr.w, T::zero(), self.gyr.j, T::zero());
        Self {
            vec: project_to_plane(curv, &self.vec),
            gyr: UnitQuaternion::try_new(yaw, T::default_epsilon())
                .unwrap_or_else(UnitQuaternion::identity),
        }
    }

    /// Component-wise interpolation: linear on `vec`, spherical on `gyr`
    ///
    /// Not a geodesic in the curved metric, only a cheap approximation that
    /// is exact at the endpoints. `t` is not clamped.
    pub fn lerp(a: &Self, b: &Self, t: T) -> Self {
        Self {
            vec: a.vec.lerp(&b.vec, t),
            gyr: slerp(&a.gyr, &b.gyr, t),
        }
    }

    /// Interpolate along `b ⊖ a` starting from `a`
    ///
    /// Unlike [`GyroVector::lerp`] the path is traced in `a`'s frame, which
    /// follows the curvature much more closely for nearby transforms.
    pub fn lerp_reverse(curv: &Curvature, a: &Self, b: &Self, t: T) -> Self {
        Self::lerp(&Self::identity(), &b.difference(curv, a), t).compose(curv, a)
    }

    /// Re-normalize the rotation after long accumulation
    pub fn renormalized(&self) -> Self {
        Self {
            vec: self.vec,
            gyr: UnitQuaternion::new_normalize(*self.gyr.quaternion()),
        }
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.vec.iter().all(|x| x.is_finite()) && self.gyr.coords.iter().all(|x| x.is_finite())
    }
}

impl GyroVector<f64> {
    /// Narrow to single precision
    pub fn to_f32(&self) -> GyroVector<f32> {
        GyroVector {
            vec: self.vec.cast::<f32>(),
            gyr: self.gyr.cast::<f32>(),
        }
    }
}

impl GyroVector<f32> {
    /// Widen to double precision
    pub fn to_f64(&self) -> GyroVector<f64> {
        GyroVector {
            vec: self.vec.cast::<f64>(),
            gyr: self.gyr.cast::<f64>(),
        }
    }
}

#[derive(Deserialize)]
struct GyroVectorRepr<T: Real> {
    vec: Vector3<T>,
    gyr: Quaternion<T>,
}

impl<T: Real> TryFrom<GyroVectorRepr<T>> for GyroVector<T> {
    type Error = WarpError;

    fn try_from(repr: GyroVectorRepr<T>) -> Result<Self, WarpError> {
        ensure_finite(&repr.vec, "gyrovector offset")?;
        if !repr.gyr.coords.iter().all(|x| x.is_finite()) {
            return Err(WarpError::NonFinite("gyrovector rotation"));
        }
        let norm = repr.gyr.norm();
        if (norm - T::one()).abs() > real(UNIT_ROTATION_TOLERANCE) {
            return Err(WarpError::NotUnitRotation {
                norm: nalgebra::try_convert(norm).unwrap_or(f64::NAN),
            });
        }
        // Kept exactly as stored so a save/load cycle is lossless
        Ok(Self::new(repr.vec, UnitQuaternion::new_unchecked(repr.gyr)))
    }
}

impl<T: Real> Default for GyroVector<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Real> Neg for GyroVector<T> {
    type Output = Self;

    fn neg(self) -> Self {
        self.inverse()
    }
}

impl<T: Real> fmt::Display for GyroVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.9}, {:.9}, {:.9}) [{:.9}, {:.9}, {:.9}, {:.9}]",
            self.vec.x, self.vec.y, self.vec.z, self.gyr.i, self.gyr.j, self.gyr.k, self.gyr.w
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::{euler_degrees, rotation_eq};
    use approx::{assert_relative_eq, relative_eq};

    fn tilings() -> Vec<Curvature> {
        [3.0, 4.0, 5.0]
            .into_iter()
            .map(|n| Curvature::from_tiling(n).unwrap())
            .collect()
    }

    fn gv(v: [f32; 3], euler: [f32; 3]) -> GyroVector<f32> {
        GyroVector::new(
            Vector3::from(v),
            euler_degrees(euler[0], euler[1], euler[2]),
        )
    }

    fn gv64(v: [f64; 3], euler: [f64; 3]) -> GyroVector<f64> {
        GyroVector::new(
            Vector3::from(v),
            euler_degrees(euler[0], euler[1], euler[2]),
        )
    }

    fn same<T: Real>(a: &GyroVector<T>, b: &GyroVector<T>, tol: T) -> bool {
        relative_eq!(a.vec, b.vec, epsilon = tol) && rotation_eq(&a.gyr, &b.gyr, tol)
    }

    #[track_caller]
    fn assert_same<T: Real>(a: &GyroVector<T>, b: &GyroVector<T>, tol: T) {
        assert!(same(a, b, tol), "{a} != {b}");
    }

    #[test]
    fn test_operator_forms_agree() {
        let g = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let a = Vector3::new(-0.5f32, 0.2, -0.4);
        let q = euler_degrees(90.0f32, -10.0, -40.0);

        for c in tilings() {
            assert_same(&g.translate(&c, &a), &g.compose(&c, &GyroVector::from_vec(a)), 1e-4);
            assert_same(
                &g.pre_translate(&c, &a),
                &GyroVector::from_vec(a).compose(&c, &g),
                1e-4,
            );
            assert_same(&g.rotate(&q), &g.compose(&c, &GyroVector::from_rotation(q)), 1e-4);
            assert_same(
                &g.pre_rotate(&q),
                &GyroVector::from_rotation(q).compose(&c, &g),
                1e-4,
            );
            assert_relative_eq!(g.point(), g.pre_rotate(&q).point(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_operator_forms_agree_f64() {
        let g = gv64([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let a = Vector3::new(-0.5f64, 0.2, -0.4);
        let q = euler_degrees(90.0f64, -10.0, -40.0);

        for c in tilings() {
            assert_same(&g.translate(&c, &a), &g.compose(&c, &GyroVector::from_vec(a)), 1e-7);
            assert_same(
                &g.pre_translate(&c, &a),
                &GyroVector::from_vec(a).compose(&c, &g),
                1e-7,
            );
            assert_same(&g.rotate(&q), &g.compose(&c, &GyroVector::from_rotation(q)), 1e-7);
            assert_same(
                &g.pre_rotate(&q),
                &GyroVector::from_rotation(q).compose(&c, &g),
                1e-7,
            );
        }
    }

    #[test]
    fn test_inverse_laws() {
        let a = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let b = gv([-0.5, 0.2, -0.4], [90.0, -10.0, -40.0]);
        let d = Vector3::new(0.3f32, -0.3, 0.2);
        let id = GyroVector::identity();

        for c in tilings() {
            assert_same(&id, &-id, 1e-4);
            assert_same(&id, &a.compose(&c, &-a), 1e-4);
            assert_same(&id, &a.difference(&c, &a), 1e-4);
            assert_same(&-a.compose(&c, &b), &(-b).compose(&c, &-a), 1e-4);
            assert_same(&a.difference(&c, &b), &a.compose(&c, &-b), 1e-4);
            assert_same(&b, &(-a).compose(&c, &a.compose(&c, &b)), 1e-4);

            assert_same(&a.translate_back(&c, &d), &a.translate(&c, &-d), 1e-4);
            assert_same(&a, &a.translate(&c, &d).translate_back(&c, &d), 1e-4);
            assert_same(&a, &a.translate_back(&c, &d).translate(&c, &d), 1e-4);

            let there_and_back = a.pre_translate(&c, &d).difference(&c, &a);
            assert_relative_eq!(*there_and_back.vec(), d, epsilon = 1e-4);
            assert!(rotation_eq(there_and_back.gyr(), &UnitQuaternion::identity(), 1e-4));

            let back_and_there = a.pre_translate_back(&c, &d).compose(&c, &a);
            assert_relative_eq!(*back_and_there.vec(), d, epsilon = 1e-4);
            assert!(rotation_eq(back_and_there.gyr(), &UnitQuaternion::identity(), 1e-4));
        }
    }

    #[test]
    fn test_inverse_laws_f64() {
        let a = gv64([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let b = gv64([-0.5, 0.2, -0.4], [90.0, -10.0, -40.0]);
        let d = Vector3::new(0.3f64, -0.3, 0.2);

        for c in tilings() {
            assert_same(&GyroVector::identity(), &a.difference(&c, &a), 1e-7);
            assert_same(&b, &(-a).compose(&c, &a.compose(&c, &b)), 1e-7);
            assert_same(&a, &a.translate(&c, &d).translate_back(&c, &d), 1e-7);
        }
    }

    #[test]
    fn test_rotate_back() {
        let a = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let q = euler_degrees(90.0f32, -10.0, -40.0);
        assert_same(&a, &a.rotate(&q).rotate_back(&q), 1e-5);
    }

    #[test]
    fn test_associativity() {
        let a = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let b = gv([-0.5, 0.2, -0.4], [90.0, -10.0, -40.0]);
        let cv = gv([-0.2, 0.0, 0.6], [10.0, -15.0, 0.0]);

        for c in tilings() {
            let left = a.compose(&c, &b).compose(&c, &cv);
            let right = a.compose(&c, &b.compose(&c, &cv));
            assert_same(&left, &right, 1e-4);
        }
    }

    #[test]
    fn test_associativity_f64() {
        let a = gv64([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let b = gv64([-0.5, 0.2, -0.4], [90.0, -10.0, -40.0]);
        let cv = gv64([-0.2, 0.0, 0.6], [10.0, -15.0, 0.0]);

        for c in tilings() {
            let left = a.compose(&c, &b).compose(&c, &cv);
            let right = a.compose(&c, &b.compose(&c, &cv));
            assert_same(&left, &right, 1e-7);
        }
    }

    #[test]
    fn test_sampled_group_laws() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut sample = || {
            let mut v = || rng.gen_range(-0.3..0.3);
            let vec = [v(), v(), v()];
            let mut e = || rng.gen_range(-180.0..180.0);
            gv64(vec, [e(), e(), e()])
        };

        for c in tilings() {
            for _ in 0..50 {
                let (a, b, cv) = (sample(), sample(), sample());
                let left = a.compose(&c, &b).compose(&c, &cv);
                let right = a.compose(&c, &b.compose(&c, &cv));
                assert_same(&left, &right, 1e-9);
                assert_same(&a.compose(&c, &a.inverse()), &GyroVector::identity(), 1e-9);
            }
        }
    }

    #[test]
    fn test_non_commutative() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let a = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let b = gv([-0.5, 0.2, -0.4], [90.0, -10.0, -40.0]);
        assert!(!same(&a.compose(&c, &b), &b.compose(&c, &a), 1e-3));
    }

    #[test]
    fn test_apply_matches_pre_translate() {
        let g = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let a = Vector3::new(0.3f32, -0.4, 0.2);

        for c in tilings() {
            let moved = g.pre_translate(&c, &a);
            assert_relative_eq!(g.apply(&c, &a), moved.apply(&c, &Vector3::zeros()), epsilon = 1e-4);
            assert_relative_eq!(g.apply(&c, &a), moved.point(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_exact_identity() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let g = GyroVector::new(
            Vector3::new(-0.283646286f32, 0.0, -0.956248403),
            UnitQuaternion::new_normalize(Quaternion::new(-0.228755936f32, 0.0, 0.973488510, 0.0)),
        );
        let zero = Vector3::zeros();
        let id = GyroVector::identity();

        assert_eq!(g, g.translate(&c, &zero));
        assert_eq!(g, g.pre_translate(&c, &zero));
        assert_eq!(g, g.compose(&c, &id));
        assert_eq!(g, id.compose(&c, &g));
    }

    #[test]
    fn test_near_boundary() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let a = GyroVector::from_vec(Vector3::new(0.9999f32, 0.0, 0.0));
        let b = GyroVector::from_vec(Vector3::new(0.9998f32, 0.0, 0.0));
        let x = a.difference(&c, &b).difference(&c, &a).compose(&c, &b);
        assert_same(&GyroVector::identity(), &x, 1e-3);
    }

    #[test]
    fn test_accumulated_walk_returns_home() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let up = Vector3::new(0.0f64, 0.0, 0.5);
        let right = Vector3::new(0.5f64, 0.0, 0.0);

        let mut x = GyroVector::identity();
        for _ in 0..5 {
            x = x.translate(&c, &up).translate(&c, &right);
        }
        for _ in 0..5 {
            x = x.translate_back(&c, &right).translate_back(&c, &up);
        }
        assert_same(&GyroVector::identity(), &x, 1e-10);

        let up = up.cast::<f32>();
        let right = right.cast::<f32>();
        let mut x = GyroVector::<f32>::identity();
        for _ in 0..5 {
            x = x.translate(&c, &up).translate(&c, &right);
        }
        for _ in 0..5 {
            x = x.translate_back(&c, &right).translate_back(&c, &up);
        }
        assert_same(&GyroVector::identity(), &x, 1e-4);
    }

    #[test]
    fn test_project_to_plane() {
        let a = Vector3::new(0.9f32, 0.01, 0.43);
        let axes = [Vector3::x(), -Vector3::x(), Vector3::z(), -Vector3::z()];

        for c in tilings() {
            let flat = |v: Vector3<f32>| GyroVector::from_vec(v).project_to_plane(&c).point();
            assert_relative_eq!(flat(Vector3::zeros()), Vector3::zeros(), epsilon = 1e-4);
            assert_relative_eq!(flat(Vector3::y() * 0.5), Vector3::zeros(), epsilon = 1e-4);
            assert_relative_eq!(flat(-Vector3::y() * 0.5), Vector3::zeros(), epsilon = 1e-4);
            for axis in axes {
                assert_relative_eq!(flat(axis * 0.5), axis * 0.5, epsilon = 1e-4);
            }

            let mut k = crate::convert::poincare_to_klein(&c, &a);
            k.y = 0.0;
            assert_relative_eq!(
                flat(a),
                crate::convert::klein_to_poincare(&c, &k),
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn test_project_to_plane_keeps_yaw() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let g = gv([0.2, 0.1, 0.1], [30.0, 60.0, 0.0]);
        let flat = g.project_to_plane(&c);
        let yaw = euler_degrees(0.0f32, 60.0, 0.0);
        // Pitch is discarded, yaw is kept
        assert!(rotation_eq(flat.gyr(), &yaw, 0.1));
        assert_relative_eq!(flat.gyr().i, 0.0);
        assert_relative_eq!(flat.gyr().k, 0.0);
    }

    #[test]
    fn test_transform_normal_is_derivative() {
        let g = gv64([0.7, 0.1, 0.2], [20.0, 50.0, 80.0]);
        let pt = Vector3::new(0.2f64, -0.5, 0.3);
        let delta = Vector3::new(-0.4f64, 0.2, -0.1).normalize();

        for c in tilings() {
            let numeric = (g.apply(&c, &(pt + delta * 1e-4)) - g.apply(&c, &pt)).normalize();
            let (new_pt, new_delta) = g.transform_normal(&c, &pt, &delta);
            assert_relative_eq!(new_pt, g.apply(&c, &pt), epsilon = 1e-12);
            assert_relative_eq!(numeric, new_delta.normalize(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_align_up_vector() {
        let a = Vector3::new(-0.3f32, -0.6, 0.2);
        let q = euler_degrees(20.0f32, 40.0, 30.0);

        for c in tilings() {
            let mut g = GyroVector::new(a, q);
            g.align_up_vector(&c);
            let local_up = g.gyr().inverse_transform_vector(&Vector3::y());
            assert_relative_eq!(up_vector(&c, g.vec()), local_up, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let a = gv([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let b = gv([-0.5, 0.2, -0.4], [90.0, -10.0, -40.0]);

        assert_same(&a, &GyroVector::lerp(&a, &b, 0.0), 1e-5);
        assert_same(&b, &GyroVector::lerp(&a, &b, 1.0), 1e-5);
        assert_same(&a, &GyroVector::lerp_reverse(&c, &a, &b, 0.0), 1e-4);
        assert_same(&b, &GyroVector::lerp_reverse(&c, &a, &b, 1.0), 1e-4);
    }

    #[test]
    fn test_precision_casts() {
        let g = gv64([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let narrow = g.to_f32();
        assert_relative_eq!(narrow.vec().x, 0.1f32);
        assert_same(&g, &narrow.to_f64(), 1e-6);
    }

    #[test]
    fn test_renormalized_and_finite() {
        let g = gv64([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        assert_same(&g, &g.renormalized(), 1e-15);
        assert!(g.is_finite());

        let bad = GyroVector::from_vec(Vector3::new(f64::NAN, 0.0, 0.0));
        assert!(!bad.is_finite());
    }

    #[test]
    fn test_display() {
        let g = GyroVector::from_vec(Vector3::new(0.5f64, -0.25, 0.0));
        assert_eq!(
            g.to_string(),
            "(0.500000000, -0.250000000, 0.000000000) [0.000000000, 0.000000000, 0.000000000, 1.000000000]"
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let g = gv64([0.1, 0.3, 0.5], [20.0, -40.0, 30.0]);
        let json = serde_json::to_string(&g).unwrap();
        let back: GyroVector<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }

    #[test]
    fn test_serde_rejects_invalid_transforms() {
        let scaled = r#"{"vec":[0.1,0.0,0.0],"gyr":[0.0,0.0,0.0,2.0]}"#;
        assert!(serde_json::from_str::<GyroVector<f64>>(scaled).is_err());

        let zero = r#"{"vec":[0.1,0.0,0.0],"gyr":[0.0,0.0,0.0,0.0]}"#;
        assert!(serde_json::from_str::<GyroVector<f64>>(zero).is_err());

        let overflow = r#"{"vec":[1e400,0.0,0.0],"gyr":[0.0,0.0,0.0,1.0]}"#;
        assert!(serde_json::from_str::<GyroVector<f64>>(overflow).is_err());

        let ok = r#"{"vec":[0.1,0.0,0.0],"gyr":[0.0,0.0,0.0,1.0]}"#;
        let g: GyroVector<f32> = serde_json::from_str(ok).unwrap();
        assert_eq!(g, GyroVector::from_vec(Vector3::new(0.1, 0.0, 0.0)));
    }
}
