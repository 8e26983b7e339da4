//! Two-sphere probe for walking characters
//!
//! A standing character is approximated by two spheres, one at the feet
//! and one at the head. Each pass collides both, feeding the combined
//! push-out into the next pass.
//!
//! ```text
//!     ( head )   (0, height, 0)
//!        |
//!     ( body )   (0, radius, 0)
//!   ────────────  ground
//! ```

use crate::hit::Hit;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, span};
use warp_core::Real;

/// Sample points of a character's collision shape, relative to its feet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProbe<T: Real> {
    pub body: Vector3<T>,
    pub head: Vector3<T>,
    pub radius: T,
}

impl<T: Real> BodyProbe<T> {
    /// Feet on the ground, head sample at `height`
    pub fn standing(height: T, radius: T) -> Self {
        Self {
            body: Vector3::new(T::zero(), radius, T::zero()),
            head: Vector3::new(T::zero(), height, T::zero()),
            radius,
        }
    }

    /// A single sphere around the origin
    pub fn centered(radius: T) -> Self {
        Self {
            body: Vector3::zeros(),
            head: Vector3::zeros(),
            radius,
        }
    }

    /// Body and head coincide, so one sample suffices
    pub fn is_head_centered(&self) -> bool {
        self.body == self.head
    }
}

/// Resolve a probe moving by `in_delta` with up to `iterations` passes
///
/// `collide` runs one pass for a sphere at the given point and radius. The
/// returned displacement includes `in_delta`. Passes stop early once
/// nothing pushes back.
pub fn iterated_collide<T, F>(
    probe: &BodyProbe<T>,
    in_delta: &Vector3<T>,
    iterations: usize,
    mut collide: F,
) -> Hit<T>
where
    T: Real,
    F: FnMut(&Vector3<T>, T) -> Hit<T>,
{
    let span = span!(Level::DEBUG, "iterated_collide", iterations);
    let _enter = span.enter();

    let mut hit = Hit::with_displacement(*in_delta);
    let r = probe.radius;

    for pass in 0..iterations {
        let body = collide(&(probe.body + hit.displacement), r);
        hit.displacement += body.displacement;
        hit.max_sin_y = hit.max_sin_y.max(body.max_sin_y);
        hit.max_sin_y_ground = hit.max_sin_y_ground.max(body.max_sin_y_ground);
        hit.source = body.source.or(hit.source);

        let settled = if probe.is_head_centered() {
            hit.min_sin_y = hit.min_sin_y.min(body.min_sin_y);
            body.displacement.norm_squared() == T::zero()
        } else {
            let head = collide(&(probe.head + hit.displacement), r);
            hit.displacement += head.displacement;
            hit.min_sin_y = hit.min_sin_y.min(head.min_sin_y);
            hit.source = head.source.or(hit.source);
            body.displacement.norm_squared() == T::zero()
                && head.displacement.norm_squared() == T::zero()
        };

        if settled {
            debug!(pass, "Probe settled");
            break;
        }
    }

    hit
}
