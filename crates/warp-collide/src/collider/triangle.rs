//! Triangle
//!
//! The cache keeps the warped triangle in corner form, `c` plus edge
//! vectors `a` and `b`, which is what the closest-point region analysis
//! wants. Warped triangles are flat between their warped vertices; that
//! approximation is good at the scale of a tile.

use super::{check_finite, invalid};
use crate::error::Result;
use nalgebra::Vector3;
use warp_core::convert::{HeightMode, unit_to_poincare};
use warp_core::mobius::mobius_add;
use warp_core::{Curvature, GyroVector, Real, real};

#[derive(Debug, Clone, PartialEq)]
pub struct TriangleCollider<T: Real> {
    p1: Vector3<T>,
    p2: Vector3<T>,
    p3: Vector3<T>,
    offset: T,
    a: Vector3<T>,
    b: Vector3<T>,
    c: Vector3<T>,
    bounding_center: Vector3<T>,
    bounding_radius: T,
}

/// False for collinear or coincident vertices
pub fn has_area<T: Real>(p1: &Vector3<T>, p2: &Vector3<T>, p3: &Vector3<T>) -> bool {
    (p1 - p2).cross(&(p3 - p2)).norm_squared() > T::zero()
}

impl<T: Real> TriangleCollider<T> {
    pub fn new(
        curv: &Curvature,
        p1: &Vector3<T>,
        p2: &Vector3<T>,
        p3: &Vector3<T>,
        offset: T,
        height: HeightMode,
    ) -> Result<Self> {
        for p in [p1, p2, p3] {
            check_finite(p, "triangle vertex")?;
        }
        if !offset.is_finite() || offset < T::zero() {
            return Err(invalid("triangle offset must be non-negative"));
        }
        if !has_area(p1, p2, p3) {
            return Err(invalid("triangle has no area"));
        }

        let mut triangle = Self {
            p1: unit_to_poincare(curv, p1, height),
            p2: unit_to_poincare(curv, p2, height),
            p3: unit_to_poincare(curv, p3, height),
            offset,
            a: Vector3::zeros(),
            b: Vector3::zeros(),
            c: Vector3::zeros(),
            bounding_center: Vector3::zeros(),
            bounding_radius: T::zero(),
        };
        triangle.place(|v| *v);
        Ok(triangle)
    }

    /// Poincaré vertices in object space
    pub fn vertices(&self) -> [Vector3<T>; 3] {
        [self.p1, self.p2, self.p3]
    }

    pub fn offset(&self) -> T {
        self.offset
    }

    pub fn update_cache(&mut self, curv: &Curvature, gv: &GyroVector<T>) {
        self.place(|v| gv.apply(curv, v));
    }

    fn place(&mut self, warp: impl Fn(&Vector3<T>) -> Vector3<T>) {
        let (q1, q2, q3) = (warp(&self.p1), warp(&self.p2), warp(&self.p3));
        self.a = q1 - q2;
        self.b = q3 - q2;
        self.c = q2;

        // Sphere around the centroid that contains all three vertices
        self.bounding_center = (q1 + q2 + q3) / real::<T>(3.0);
        let r2 = [q1, q2, q3]
            .iter()
            .map(|q| (q - self.bounding_center).norm_squared())
            .fold(T::zero(), |acc, d| acc.max(d));
        self.bounding_radius = r2.sqrt();
    }

    /// Lower bound on the distance from `p` to the cached triangle
    pub fn distance_estimate(&self, p: &Vector3<T>) -> T {
        (p - self.bounding_center).norm() - self.bounding_radius
    }

    pub fn closest_point(&self, p: &Vector3<T>) -> Vector3<T> {
        closest_point_on_triangle(p, &self.a, &self.b, &self.c)
    }

    /// Uncached query
    ///
    /// Translates the vertices only and works in the transform's unrotated
    /// frame, rotating the query in and the result back out.
    pub fn closest_point_with(
        &self,
        curv: &Curvature,
        p: &Vector3<T>,
        gv: &GyroVector<T>,
    ) -> Vector3<T> {
        let q1 = mobius_add(curv, gv.vec(), &self.p1);
        let q2 = mobius_add(curv, gv.vec(), &self.p2);
        let q3 = mobius_add(curv, gv.vec(), &self.p3);
        let local = gv.gyr().inverse_transform_vector(p);
        gv.gyr() * closest_point_on_triangle(&local, &(q1 - q2), &(q3 - q2), &q2)
    }
}

/// Closest point to `p` on the triangle `c`, `c + a`, `c + b`
///
/// Classifies `p` into one of the seven Voronoi regions of the triangle
/// (interior, three edges, three vertices) using unnormalized barycentric
/// coordinates `s` along `a` and `t` along `b`.
pub fn closest_point_on_triangle<T: Real>(
    p: &Vector3<T>,
    a: &Vector3<T>,
    b: &Vector3<T>,
    c: &Vector3<T>,
) -> Vector3<T> {
    let zero = T::zero();
    let one = T::one();
    let clamp01 = |x: T| x.clamp(zero, one);

    let v = c - p;
    let aa = a.dot(a);
    let ab = a.dot(b);
    let bb = b.dot(b);
    let av = a.dot(&v);
    let bv = b.dot(&v);

    let det = aa * bb - ab * ab;
    let mut s = ab * bv - bb * av;
    let mut t = ab * av - aa * bv;

    if s + t < det {
        if s < zero {
            if t < zero && av < zero {
                s = clamp01(-av / aa);
                t = zero;
            } else {
                s = zero;
                t = clamp01(-bv / bb);
            }
        } else if t < zero {
            s = clamp01(-av / aa);
            t = zero;
        } else {
            let inv_det = one / det;
            s *= inv_det;
            t *= inv_det;
        }
    } else {
        // Past the far edge from c + a to c + b
        let denom = aa - real::<T>(2.0) * ab + bb;
        if s < zero {
            let tmp0 = ab + av;
            let tmp1 = bb + bv;
            if tmp1 > tmp0 {
                s = clamp01((tmp1 - tmp0) / denom);
                t = one - s;
            } else {
                s = zero;
                t = clamp01(-bv / bb);
            }
        } else if t < zero {
            if aa + av > ab + bv {
                s = clamp01((bb + bv - ab - av) / denom);
                t = one - s;
            } else {
                s = clamp01(-av / aa);
                t = zero;
            }
        } else {
            s = clamp01((bb + bv - ab - av) / denom);
            t = one - s;
        }
    }

    c + a * s + b * t
}
