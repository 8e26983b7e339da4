//! Collision tuning

use serde::{Deserialize, Serialize};

/// Collision engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Probe radius multiplier within which surfaces count as ground
    pub ground_pad_ratio: f64,
    /// Squared Poincaré distance beyond which spherical groups are skipped
    ///
    /// Past this point a group is on the far side of the sphere and its
    /// projection wraps around.
    pub spherical_cull_dist_sq: f64,
    /// Push-out passes for iterated queries
    pub iterations: usize,
    /// Squared Poincaré distance of a group's origin beyond which
    /// [`ColliderWorld::refresh_group`](crate::ColliderWorld::refresh_group)
    /// leaves it inactive; `None` refreshes every group
    pub update_dist_sq: Option<f64>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            ground_pad_ratio: 1.01,
            spherical_cull_dist_sq: 2.0,
            iterations: 2,
            update_dist_sq: Some(0.99),
        }
    }
}

impl CollisionConfig {
    /// Extra push-out passes, for crowded geometry where one pass leaves
    /// the probe wedged between surfaces
    pub fn precise() -> Self {
        Self {
            iterations: 4,
            ..Default::default()
        }
    }

    /// One pass and no ground padding
    pub fn single_pass() -> Self {
        Self {
            ground_pad_ratio: 1.0,
            iterations: 1,
            ..Default::default()
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_update_dist_sq(mut self, dist_sq: Option<f64>) -> Self {
        self.update_dist_sq = dist_sq;
        self
    }

    pub fn with_ground_pad_ratio(mut self, ratio: f64) -> Self {
        self.ground_pad_ratio = ratio;
        self
    }
}
