//! The collision world
//!
//! Ties the curvature lifecycle to the group registry: queries fail until a
//! tiling is set, and switching to a different tiling is a world reload
//! that drops every group.

use crate::collider::Collider;
use crate::config::CollisionConfig;
use crate::engine::{CacheMode, collide};
use crate::error::Result;
use crate::hit::Hit;
use crate::iterated::{BodyProbe, iterated_collide};
use crate::registry::{ColliderGroup, GroupHandle, GroupRegistry, OwnerId};
use crate::shapes::ShapeSet;
use nalgebra::Vector3;
use std::ops::Range;
use tracing::info;
use warp_core::domain::{ensure_finite, guard_in_ball};
use warp_core::{Curvature, GyroVector, Real, Space, real};

/// Curvature, registered collider groups and tuning
#[derive(Debug, Clone)]
pub struct ColliderWorld<T: Real = f32> {
    space: Space,
    registry: GroupRegistry<T>,
    config: CollisionConfig,
}

impl<T: Real> ColliderWorld<T> {
    /// World with no curvature set yet
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            space: Space::new(),
            registry: GroupRegistry::new(),
            config,
        }
    }

    pub fn with_tiling(n: f64, config: CollisionConfig) -> Result<Self> {
        let mut world = Self::new(config);
        world.set_curvature(n)?;
        Ok(world)
    }

    /// Load a tiling
    ///
    /// Returns `true` if the curvature changed. Collider geometry is baked
    /// for one curvature, so a change drops every registered group.
    pub fn set_curvature(&mut self, n: f64) -> Result<bool> {
        let changed = self.space.set_curvature(n)?;
        if changed && !self.registry.is_empty() {
            info!(
                groups = self.registry.len(),
                "Curvature changed, dropping collider groups"
            );
            self.registry.clear();
        }
        Ok(changed)
    }

    pub fn curvature(&self) -> Result<&Curvature> {
        Ok(self.space.curvature()?)
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CollisionConfig) {
        self.config = config;
    }

    pub fn registry(&self) -> &GroupRegistry<T> {
        &self.registry
    }

    /// Add a group of colliders owned by `owner`, placed at `local`
    pub fn register_group(
        &mut self,
        colliders: Vec<Collider<T>>,
        owner: OwnerId,
        local: GyroVector<T>,
    ) -> GroupHandle {
        self.registry
            .register(ColliderGroup::new(colliders, owner, local))
    }

    /// Build colliders from authoring shapes and register them
    pub fn register_shapes(
        &mut self,
        shapes: &ShapeSet,
        owner: OwnerId,
        local: GyroVector<T>,
    ) -> Result<GroupHandle> {
        let colliders = shapes.build(self.space.curvature()?)?;
        Ok(self.register_group(colliders, owner, local))
    }

    pub fn unregister_group(&mut self, handle: GroupHandle) -> Result<ColliderGroup<T>> {
        self.registry.unregister(handle)
    }

    pub fn set_group_active(&mut self, handle: GroupHandle, active: bool) -> Result<()> {
        self.registry.set_active(handle, active)
    }

    /// Hide every group; owners that moved re-activate theirs on update
    pub fn deactivate_all(&mut self) {
        self.registry.deactivate_all();
    }

    pub fn set_local_transform(&mut self, handle: GroupHandle, local: GyroVector<T>) -> Result<()> {
        self.registry.set_local(handle, local)
    }

    /// Rebuild a group's caches for this tick's composed transform
    pub fn update_group(&mut self, handle: GroupHandle, composed: &GyroVector<T>) -> Result<()> {
        let curv = self.space.curvature()?;
        self.registry.update(curv, handle, composed)
    }

    /// Per-tick update that skips far groups
    ///
    /// Groups whose composed origin lies beyond `update_dist_sq` are left
    /// inactive instead of paying for a cache rebuild nobody can reach.
    /// Returns whether the group was updated.
    pub fn refresh_group(&mut self, handle: GroupHandle, composed: &GyroVector<T>) -> Result<bool> {
        let near = match self.config.update_dist_sq {
            Some(max) => composed.vec().norm_squared() <= real(max),
            None => true,
        };
        if near {
            self.update_group(handle, composed)?;
        } else {
            self.registry.deactivate(handle)?;
        }
        Ok(near)
    }

    /// Collide a sphere against every group
    pub fn collide(&self, p: &Vector3<T>, r: T, mode: CacheMode<'_, T>) -> Result<Hit<T>> {
        let (curv, p) = self.query(p)?;
        Ok(collide(curv, &self.config, self.registry.iter(), &p, r, mode))
    }

    /// Collide against groups whose slot index falls in `range`
    pub fn collide_range(
        &self,
        range: Range<usize>,
        p: &Vector3<T>,
        r: T,
        mode: CacheMode<'_, T>,
    ) -> Result<Hit<T>> {
        let (curv, p) = self.query(p)?;
        Ok(collide(curv, &self.config, self.registry.iter_slots(range), &p, r, mode))
    }

    /// Collide against a single group
    pub fn collide_group(
        &self,
        handle: GroupHandle,
        p: &Vector3<T>,
        r: T,
        mode: CacheMode<'_, T>,
    ) -> Result<Hit<T>> {
        let (curv, p) = self.query(p)?;
        let group = self.registry.get(handle)?;
        Ok(collide(curv, &self.config, [(handle, group)], &p, r, mode))
    }

    /// Resolve a body/head probe moving by `in_delta` against every group
    pub fn iterated_collide(&self, probe: &BodyProbe<T>, in_delta: &Vector3<T>) -> Result<Hit<T>> {
        let curv = self.space.curvature()?;
        ensure_finite(in_delta, "probe delta")?;
        Ok(iterated_collide(
            probe,
            in_delta,
            self.config.iterations,
            |p, r| {
                let p = guard_in_ball(curv, p);
                collide(curv, &self.config, self.registry.iter(), &p, r, CacheMode::Cached)
            },
        ))
    }

    fn query(&self, p: &Vector3<T>) -> Result<(&Curvature, Vector3<T>)> {
        let curv = self.space.curvature()?;
        ensure_finite(p, "query point")?;
        Ok((curv, guard_in_ball(curv, p)))
    }
}

impl<T: Real> Default for ColliderWorld<T> {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}
