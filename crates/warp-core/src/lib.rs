//! Warp Core - Gyrovector algebra for curved worlds
//!
//! Warp renders and simulates navigable worlds tiled by squares in hyperbolic,
//! spherical or Euclidean space. Every object transform is a [`GyroVector`]:
//! a point in the Poincaré ball plus the holonomy rotation picked up while
//! getting there. Transforms compose with Möbius addition instead of vector
//! addition, so composition is associative but not commutative, and walking a
//! closed loop of tiles can leave you rotated.
//!
//! # Coordinate Charts
//!
//! ```text
//!   unit (tile-local, designer facing)
//!        │  unit_to_klein / klein_to_unit       (scale by klein_v, optional tan-K height)
//!        ▼
//!   Klein (straight lines are geodesics, used for half-space tests)
//!        │  klein_to_poincare / poincare_to_klein
//!        ▼
//!   Poincaré (conformal, all gyrovector algebra happens here)
//! ```
//!
//! # Curvature
//!
//! Nothing here reads global state. The tiling valence is turned into a
//! [`Curvature`] once, and every operation that depends on it takes it by
//! reference. [`Space`] wraps the "not yet initialized" state for callers that
//! need an explicit world-load lifecycle.

pub mod convert;
pub mod curvature;
pub mod domain;
pub mod error;
pub mod frame;
pub mod gyrovector;
pub mod mobius;
pub mod rotation;
pub mod scalar;
pub mod walk;

// Re-export commonly used types
pub use convert::HeightMode;
pub use curvature::{Curvature, CurvatureSign, Space};
pub use error::{Result, WarpError};
pub use frame::{ArcLimit, Placement, WorldFrame};
pub use gyrovector::GyroVector;
pub use scalar::{Real, real};

pub use nalgebra::{Quaternion, UnitQuaternion, Vector3};
