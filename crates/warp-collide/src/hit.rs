//! Collision results

use crate::registry::{GroupHandle, OwnerId};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use warp_core::Real;

/// Which collider produced the last push-out of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitSource {
    pub group: GroupHandle,
    /// Index of the collider within its group
    pub collider: usize,
    pub owner: OwnerId,
}

/// Accumulated result of a collision query
///
/// Slopes are the sine of the angle between the contact direction and the
/// vertical: 1 for flat ground underfoot, 0 for a wall, -1 for a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit<T: Real> {
    /// Total push-out to apply to the query point
    pub displacement: Vector3<T>,
    /// Steepest ground slope within the padded radius
    pub max_sin_y_ground: T,
    /// Largest slope among penetrating contacts
    pub max_sin_y: T,
    /// Smallest slope among penetrating contacts
    pub min_sin_y: T,
    /// Last collider that pushed the query out
    pub source: Option<HitSource>,
}

impl<T: Real> Hit<T> {
    pub fn new() -> Self {
        Self {
            displacement: Vector3::zeros(),
            max_sin_y_ground: T::zero(),
            max_sin_y: T::zero(),
            min_sin_y: T::zero(),
            source: None,
        }
    }

    /// A query that starts with a displacement already applied
    pub fn with_displacement(displacement: Vector3<T>) -> Self {
        Self {
            displacement,
            ..Self::new()
        }
    }

    /// Whether any collider pushed the query out
    pub fn is_hit(&self) -> bool {
        self.source.is_some()
    }

    /// Something solid is underfoot
    pub fn is_grounded(&self) -> bool {
        self.max_sin_y_ground > T::zero()
    }
}

impl<T: Real> Default for Hit<T> {
    fn default() -> Self {
        Self::new()
    }
}
