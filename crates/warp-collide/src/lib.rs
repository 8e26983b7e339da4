//! Warp Collide - Sphere collision in curved space
//!
//! Objects carry collision geometry authored in flat tile coordinates. Each
//! tick an object's composed [`GyroVector`](warp_core::GyroVector) warps its
//! colliders into the player's frame, and the player's body is then pushed
//! out of anything it overlaps.
//!
//! # Query Flow
//!
//! ```text
//! ShapeSet → [build] → Vec<Collider> → [register] → GroupRegistry
//!                                                       ↓ update_group (per tick)
//! probe point, radius → [collide] → Hit { displacement, slopes, source }
//! ```
//!
//! All state lives in a [`ColliderWorld`] owned by the simulation thread;
//! every mutation takes `&mut`, so no locking is involved.

pub mod collider;
pub mod config;
pub mod engine;
pub mod error;
pub mod hit;
pub mod iterated;
pub mod registry;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use collider::{Collider, CylinderCollider, PlaneCollider, SphereCollider, TriangleCollider};
pub use config::CollisionConfig;
pub use engine::{CacheMode, collide};
pub use error::{CollideError, Result};
pub use hit::{Hit, HitSource};
pub use iterated::{BodyProbe, iterated_collide};
pub use registry::{ColliderGroup, GroupHandle, GroupRegistry, OwnerId};
pub use shapes::ShapeSet;
pub use world::ColliderWorld;
