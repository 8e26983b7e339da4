//! Sphere

use super::{check_finite, invalid};
use crate::error::Result;
use nalgebra::Vector3;
use warp_core::convert::{
    HeightMode, poincare_scale_factor, unit_to_poincare, unit_to_poincare_scale,
};
use warp_core::rotation::normalize_or_zero;
use warp_core::{Curvature, GyroVector, Real};

#[derive(Debug, Clone, PartialEq)]
pub struct SphereCollider<T: Real> {
    c: Vector3<T>,
    r: T,
    wc: Vector3<T>,
    wr: T,
}

impl<T: Real> SphereCollider<T> {
    /// Sphere of unit radius `r` around unit point `c`
    pub fn new(curv: &Curvature, c: &Vector3<T>, r: T, height: HeightMode) -> Result<Self> {
        check_finite(c, "sphere centre")?;
        if !r.is_finite() || r <= T::zero() {
            return Err(invalid("sphere radius must be positive"));
        }

        let mut sphere = Self {
            c: unit_to_poincare(curv, c, height),
            r: unit_to_poincare_scale(curv, c, r, height),
            wc: Vector3::zeros(),
            wr: T::zero(),
        };
        sphere.update_cache(curv, &GyroVector::identity());
        Ok(sphere)
    }

    pub fn center(&self) -> &Vector3<T> {
        &self.c
    }

    pub fn radius(&self) -> T {
        self.r
    }

    pub fn update_cache(&mut self, curv: &Curvature, gv: &GyroVector<T>) {
        self.wc = gv.apply(curv, &self.c);
        // The Poincaré chart is conformal, so the radius scales with the centre
        self.wr = self.r * poincare_scale_factor(curv, &self.wc);
    }

    pub fn closest_point(&self, p: &Vector3<T>) -> Vector3<T> {
        self.wc + normalize_or_zero(&(p - self.wc)) * self.wr
    }
}
