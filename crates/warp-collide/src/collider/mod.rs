//! Collider shapes
//!
//! Every shape is authored in unit tile coordinates, converted once to the
//! Poincaré ball, and then cached under the owning group's composed
//! transform each tick. Queries run against the cache, or against an
//! explicit transform when the cache is stale.
//!
//! ```text
//!   unit coords ──new()──► Poincaré (object space)
//!                              │ update_cache(composed)
//!                              ▼
//!                       cached (player space) ──closest_point(p)──► contact
//! ```

mod cylinder;
mod plane;
mod sphere;
mod triangle;

pub use cylinder::CylinderCollider;
pub use plane::PlaneCollider;
pub use sphere::SphereCollider;
pub use triangle::{TriangleCollider, closest_point_on_triangle, has_area};

use nalgebra::Vector3;
use warp_core::{Curvature, GyroVector, Real};

/// A collidable surface
#[derive(Debug, Clone, PartialEq)]
pub enum Collider<T: Real> {
    Plane(PlaneCollider<T>),
    Sphere(SphereCollider<T>),
    Cylinder(CylinderCollider<T>),
    Triangle(TriangleCollider<T>),
}

impl<T: Real> Collider<T> {
    /// Shape name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Collider::Plane(_) => "plane",
            Collider::Sphere(_) => "sphere",
            Collider::Cylinder(_) => "cylinder",
            Collider::Triangle(_) => "triangle",
        }
    }

    /// Recompute the cached geometry under `gv`
    pub fn update_cache(&mut self, curv: &Curvature, gv: &GyroVector<T>) {
        match self {
            Collider::Plane(c) => c.update_cache(curv, gv),
            Collider::Sphere(c) => c.update_cache(curv, gv),
            Collider::Cylinder(c) => c.update_cache(curv, gv),
            Collider::Triangle(c) => c.update_cache(curv, gv),
        }
    }

    /// Closest surface point to `p`, using the cache
    pub fn closest_point(&self, curv: &Curvature, p: &Vector3<T>) -> Vector3<T> {
        match self {
            Collider::Plane(c) => c.closest_point(curv, p),
            Collider::Sphere(c) => c.closest_point(p),
            Collider::Cylinder(c) => c.closest_point(p),
            Collider::Triangle(c) => c.closest_point(p),
        }
    }

    /// Closest surface point to `p` with the shape placed by `gv`
    ///
    /// Leaves the cache untouched.
    pub fn closest_point_with(
        &self,
        curv: &Curvature,
        p: &Vector3<T>,
        gv: &GyroVector<T>,
    ) -> Vector3<T> {
        match self {
            Collider::Plane(c) => c.closest_point_with(curv, p, gv),
            Collider::Triangle(c) => c.closest_point_with(curv, p, gv),
            other => {
                let mut placed = other.clone();
                placed.update_cache(curv, gv);
                placed.closest_point(curv, p)
            }
        }
    }

    /// Conservative lower bound on the distance from `p` to the cached shape
    pub fn distance_estimate(&self, p: &Vector3<T>) -> T {
        match self {
            Collider::Triangle(c) => c.distance_estimate(p),
            _ => T::zero(),
        }
    }

    /// Thickness added to the surface
    pub fn offset(&self) -> T {
        match self {
            Collider::Triangle(c) => c.offset(),
            _ => T::zero(),
        }
    }
}

impl<T: Real> From<PlaneCollider<T>> for Collider<T> {
    fn from(c: PlaneCollider<T>) -> Self {
        Collider::Plane(c)
    }
}

impl<T: Real> From<SphereCollider<T>> for Collider<T> {
    fn from(c: SphereCollider<T>) -> Self {
        Collider::Sphere(c)
    }
}

impl<T: Real> From<CylinderCollider<T>> for Collider<T> {
    fn from(c: CylinderCollider<T>) -> Self {
        Collider::Cylinder(c)
    }
}

impl<T: Real> From<TriangleCollider<T>> for Collider<T> {
    fn from(c: TriangleCollider<T>) -> Self {
        Collider::Triangle(c)
    }
}

pub(crate) fn invalid(msg: impl Into<String>) -> crate::error::CollideError {
    crate::error::CollideError::InvalidShape(msg.into())
}

pub(crate) fn check_finite<T: Real>(v: &Vector3<T>, what: &str) -> crate::error::Result<()> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(invalid(format!("{what} is not finite")))
    }
}
