//! Cylinder between two end points
//!
//! Capped cylinders have hemispherical ends (a capsule). Uncapped ones end
//! in flat disks.

use super::{check_finite, invalid};
use crate::error::Result;
use nalgebra::Vector3;
use warp_core::convert::{
    HeightMode, poincare_scale_factor, unit_to_poincare, unit_to_poincare_scale,
};
use warp_core::rotation::normalize_or_zero;
use warp_core::{Curvature, GyroVector, Real, real};

#[derive(Debug, Clone, PartialEq)]
pub struct CylinderCollider<T: Real> {
    a: Vector3<T>,
    b: Vector3<T>,
    r: T,
    capped: bool,
    /// Cached midpoint
    wc: Vector3<T>,
    /// Cached unit axis
    wd: Vector3<T>,
    wr: T,
    /// Cached half length
    wh: T,
}

impl<T: Real> CylinderCollider<T> {
    pub fn new(
        curv: &Curvature,
        a: &Vector3<T>,
        b: &Vector3<T>,
        r: T,
        capped: bool,
        height: HeightMode,
    ) -> Result<Self> {
        check_finite(a, "cylinder end")?;
        check_finite(b, "cylinder end")?;
        if a == b {
            return Err(invalid("cylinder ends coincide"));
        }
        if !r.is_finite() || r <= T::zero() {
            return Err(invalid("cylinder radius must be positive"));
        }

        let mid = (a + b) * real::<T>(0.5);
        let mut cylinder = Self {
            a: unit_to_poincare(curv, a, height),
            b: unit_to_poincare(curv, b, height),
            r: unit_to_poincare_scale(curv, &mid, r, height),
            capped,
            wc: Vector3::zeros(),
            wd: Vector3::y(),
            wr: T::zero(),
            wh: T::zero(),
        };
        cylinder.update_cache(curv, &GyroVector::identity());
        Ok(cylinder)
    }

    pub fn is_capped(&self) -> bool {
        self.capped
    }

    pub fn update_cache(&mut self, curv: &Curvature, gv: &GyroVector<T>) {
        let half = real::<T>(0.5);
        let wa = gv.apply(curv, &self.a);
        let wb = gv.apply(curv, &self.b);
        self.wc = (wa + wb) * half;
        self.wr = self.r * poincare_scale_factor(curv, &self.wc);

        let axis = (wb - wa) * half;
        self.wh = axis.norm();
        // Distinct ends stay distinct under a Möbius map
        if self.wh > T::zero() {
            self.wd = axis / self.wh;
        }
    }

    pub fn closest_point(&self, p: &Vector3<T>) -> Vector3<T> {
        let (wc, wd, wr, wh) = (self.wc, self.wd, self.wr, self.wh);
        let mut pc = p - wc;
        let mut lp = pc.dot(&wd);

        if self.capped {
            lp = lp.clamp(-wh, wh);
            pc -= wd * lp;
            return wc + wd * lp + normalize_or_zero(&pc) * wr;
        }

        pc -= wd * lp;
        if lp >= -wh && lp <= wh {
            return wc + wd * lp + normalize_or_zero(&pc) * wr;
        }

        // Beyond an end: closest point on the end disk
        lp = lp.clamp(-wh, wh);
        let r2 = pc.norm_squared();
        if r2 > wr * wr {
            pc *= wr / r2.sqrt();
        }
        wc + wd * lp + pc
    }
}
