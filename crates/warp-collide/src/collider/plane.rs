//! Infinite plane
//!
//! Authored as a point `c` on the plane whose direction from the tile
//! centre is also the plane normal. Geodesic planes are flat in the Klein
//! chart, so the cache and the projection both live there.

use super::{check_finite, invalid};
use crate::error::Result;
use nalgebra::Vector3;
use warp_core::convert::{
    HeightMode, klein_to_poincare, poincare_to_klein, poincare_to_klein_normal, unit_to_poincare,
};
use warp_core::{Curvature, GyroVector, Real};

#[derive(Debug, Clone, PartialEq)]
pub struct PlaneCollider<T: Real> {
    /// Poincaré point on the plane, also its normal direction
    c: Vector3<T>,
    /// Cached Klein point on the plane
    kc: Vector3<T>,
    /// Cached Klein unit normal
    kn: Vector3<T>,
}

impl<T: Real> PlaneCollider<T> {
    /// Plane through unit point `c`, facing along `c`
    pub fn new(curv: &Curvature, c: &Vector3<T>, height: HeightMode) -> Result<Self> {
        check_finite(c, "plane point")?;
        if c.norm_squared() == T::zero() {
            return Err(invalid("plane point at the tile centre has no normal"));
        }

        let mut plane = Self {
            c: unit_to_poincare(curv, c, height),
            kc: Vector3::zeros(),
            kn: Vector3::zeros(),
        };
        plane.update_cache(curv, &GyroVector::identity());
        Ok(plane)
    }

    pub fn point(&self) -> &Vector3<T> {
        &self.c
    }

    pub fn update_cache(&mut self, curv: &Curvature, gv: &GyroVector<T>) {
        (self.kc, self.kn) = self.place(curv, gv);
    }

    pub fn closest_point(&self, curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
        project(curv, p, &self.kc, &self.kn)
    }

    pub fn closest_point_with(
        &self,
        curv: &Curvature,
        p: &Vector3<T>,
        gv: &GyroVector<T>,
    ) -> Vector3<T> {
        let (kc, kn) = self.place(curv, gv);
        project(curv, p, &kc, &kn)
    }

    fn place(&self, curv: &Curvature, gv: &GyroVector<T>) -> (Vector3<T>, Vector3<T>) {
        let q = gv.pre_translate(curv, &self.c);
        let wc = q.point();
        let wn = q.gyr() * self.c;
        (
            poincare_to_klein(curv, &wc),
            poincare_to_klein_normal(curv, &wc, &wn),
        )
    }
}

fn project<T: Real>(
    curv: &Curvature,
    p: &Vector3<T>,
    kc: &Vector3<T>,
    kn: &Vector3<T>,
) -> Vector3<T> {
    let kp = poincare_to_klein(curv, p);
    let kp = kp - kn * (kp - kc).dot(kn);
    klein_to_poincare(curv, &kp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use warp_core::rotation::euler_degrees;

    #[test]
    fn test_euclidean_plane() {
        let c = Curvature::euclidean();
        let plane =
            PlaneCollider::new(&c, &Vector3::new(0.5f32, 0.0, 0.0), HeightMode::Linear).unwrap();

        let hit = plane.closest_point(&c, &Vector3::new(0.2, 0.3, -0.1));
        assert_relative_eq!(hit, Vector3::new(0.5, 0.3, -0.1), epsilon = 1e-6);

        // Points on the plane project to themselves
        assert_relative_eq!(plane.closest_point(&c, &hit), hit, epsilon = 1e-6);
    }

    #[test]
    fn test_hyperbolic_projection_lies_on_plane() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let mut plane =
            PlaneCollider::new(&c, &Vector3::new(0.0f64, 0.0, 0.5), HeightMode::TanK).unwrap();
        let gv = GyroVector::new(Vector3::new(0.1, 0.0, -0.2), euler_degrees(0.0, 25.0, 0.0));
        plane.update_cache(&c, &gv);

        let p = Vector3::new(0.3, 0.2, 0.1);
        let hit = plane.closest_point(&c, &p);
        let offset = (poincare_to_klein(&c, &hit) - plane.kc).dot(&plane.kn);
        assert_relative_eq!(offset, 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.closest_point(&c, &hit), hit, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_transform_matches_cache() {
        let c = Curvature::from_tiling(6.0).unwrap();
        let mut plane =
            PlaneCollider::new(&c, &Vector3::new(0.3f64, 0.0, 0.3), HeightMode::TanK).unwrap();
        let gv = GyroVector::new(Vector3::new(-0.2, 0.0, 0.1), euler_degrees(0.0, -60.0, 0.0));
        let p = Vector3::new(0.1, 0.05, 0.0);

        let uncached = plane.closest_point_with(&c, &p, &gv);
        plane.update_cache(&c, &gv);
        assert_relative_eq!(plane.closest_point(&c, &p), uncached, epsilon = 1e-12);
    }

    #[test]
    fn test_centre_plane_rejected() {
        let c = Curvature::euclidean();
        assert!(PlaneCollider::new(&c, &Vector3::<f32>::zeros(), HeightMode::Linear).is_err());
    }
}
