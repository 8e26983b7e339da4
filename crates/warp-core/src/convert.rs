//! Conversions between the unit, Klein and Poincaré charts
//!
//! Unit coordinates are what level authors work in: a tile spans roughly
//! `[-0.5, 0.5]` regardless of curvature. Klein coordinates scale that by
//! the corner position `klein_v`, and Poincaré coordinates are the conformal
//! chart the gyrovector algebra runs in.

use crate::curvature::Curvature;
use crate::scalar::{Real, real};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// How the vertical axis maps from unit to Klein coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightMode {
    /// Height scales like the horizontal axes
    Linear,
    /// Height passes through `tan_k` so floors and ceilings keep a consistent
    /// apparent height across curvatures
    #[default]
    TanK,
}

/// Klein point to Poincaré point
pub fn klein_to_poincare<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
    if curv.is_euclidean() {
        return *p;
    }
    let k: T = curv.k();
    let s = (T::one() + k * p.norm_squared()).max(T::zero()).sqrt();
    p / (s + T::one())
}

/// Poincaré point to Klein point
pub fn poincare_to_klein<T: Real>(curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
    if curv.is_euclidean() {
        return *p;
    }
    let k: T = curv.k();
    p * real::<T>(2.0) / (T::one() - k * p.norm_squared())
}

/// Plane normal at Klein point `p` to the matching Poincaré normal
pub fn klein_to_poincare_normal<T: Real>(
    curv: &Curvature,
    p: &Vector3<T>,
    n: &Vector3<T>,
) -> Vector3<T> {
    if curv.is_euclidean() {
        return n.normalize();
    }
    let k: T = curv.k();
    let s = T::one() + (T::one() + k * p.norm_squared()).sqrt();
    (n * s + p * (k * n.dot(p))).normalize()
}

/// Plane normal at Poincaré point `p` to the matching Klein normal
pub fn poincare_to_klein_normal<T: Real>(
    curv: &Curvature,
    p: &Vector3<T>,
    n: &Vector3<T>,
) -> Vector3<T> {
    if curv.is_euclidean() {
        return n.normalize();
    }
    let k: T = curv.k();
    (n * (T::one() + k * p.norm_squared()) - p * (real::<T>(2.0) * k * n.dot(p))).normalize()
}

/// Unit tile coordinates to Klein coordinates
pub fn unit_to_klein<T: Real>(curv: &Curvature, u: &Vector3<T>, height: HeightMode) -> Vector3<T> {
    let mut p = u * curv.klein_v::<T>();
    if height == HeightMode::TanK {
        let k: T = curv.k();
        p.y = curv.tan_k(p.y) * (T::one() + k * (p.x * p.x + p.z * p.z)).sqrt();
    }
    p
}

/// Klein coordinates to unit tile coordinates
pub fn klein_to_unit<T: Real>(curv: &Curvature, p: &Vector3<T>, height: HeightMode) -> Vector3<T> {
    let mut p = *p;
    if height == HeightMode::TanK {
        let k: T = curv.k();
        p.y = curv.atan_k(p.y / (T::one() + k * (p.x * p.x + p.z * p.z)).sqrt());
    }
    p / curv.klein_v::<T>()
}

pub fn unit_to_poincare<T: Real>(curv: &Curvature, u: &Vector3<T>, height: HeightMode) -> Vector3<T> {
    klein_to_poincare(curv, &unit_to_klein(curv, u, height))
}

pub fn poincare_to_unit<T: Real>(curv: &Curvature, p: &Vector3<T>, height: HeightMode) -> Vector3<T> {
    klein_to_unit(curv, &poincare_to_klein(curv, p), height)
}

/// Radius `r` authored at unit point `u`, in Poincaré units
pub fn unit_to_poincare_scale<T: Real>(
    curv: &Curvature,
    u: &Vector3<T>,
    r: T,
    height: HeightMode,
) -> T {
    if curv.is_euclidean() {
        return r;
    }
    let k: T = curv.k();
    let kp = unit_to_klein(curv, u, height);
    let p = (T::one() + k * kp.norm_squared()).sqrt();
    r * curv.klein_v::<T>() / (p * (p + T::one()))
}

/// Conformal scale factor of the Poincaré chart at `p`
pub fn poincare_scale_factor<T: Real>(curv: &Curvature, p: &Vector3<T>) -> T {
    let k: T = curv.k();
    T::one() + k * p.norm_squared()
}
