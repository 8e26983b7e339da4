//! Error types for collision queries

use crate::registry::GroupHandle;
use thiserror::Error;
use warp_core::WarpError;

/// Collision errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollideError {
    /// Curvature or domain failure from the math layer
    #[error(transparent)]
    Warp(#[from] WarpError),

    /// The group was unregistered, possibly with its slot reused since
    #[error("Stale group handle {0}")]
    StaleHandle(GroupHandle),

    /// Shape parameters that cannot describe a surface
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

/// Result type for collision operations
pub type Result<T> = std::result::Result<T, CollideError>;
