//! Error types for curved-space math

use thiserror::Error;

/// Core errors
///
/// The math itself is deterministic, so none of these are transient. They
/// signal either a missing world setup or input outside the valid domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarpError {
    /// Curvature was read before `set_curvature` was called
    #[error("Curvature is not set; call set_curvature before any gyrovector math")]
    CurvatureUnset,

    /// Tiling valence cannot produce a square tiling
    #[error("Invalid tiling valence {0}: must be finite and greater than 2")]
    InvalidValence(f64),

    /// Point on or outside the boundary of the hyperbolic ball
    #[error("Point outside the Poincaré ball: |p| = {norm}")]
    OutsideDomain { norm: f64 },

    /// Stored rotation quaternion is not unit length
    #[error("Rotation is not a unit quaternion: |q| = {norm}")]
    NotUnitRotation { norm: f64 },

    /// NaN or infinity produced by a computation
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, WarpError>;
