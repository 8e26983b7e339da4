//! Collision resolution
//!
//! One pass visits every active group in slot order and every collider in
//! group order. Each penetrating collider pushes the query point out
//! before the next collider is tested, so a pass is a greedy sequential
//! solve: reordering colliders can change the result.
//!
//! ```text
//!   for group in registry (slot order, active only)
//!     for collider in group
//!       cull ─► closest point ─► delta = closest - p
//!       |delta| + offset < radius × pad   → record ground slope
//!       |delta| + offset < radius         → push p out, record hit
//! ```

use crate::config::CollisionConfig;
use crate::hit::{Hit, HitSource};
use crate::registry::{ColliderGroup, GroupHandle};
use nalgebra::Vector3;
use tracing::warn;
use warp_core::{Curvature, GyroVector, Real, real};

/// Where collider geometry comes from during a query
#[derive(Debug, Clone, Copy)]
pub enum CacheMode<'a, T: Real> {
    /// Use each group's cache, built from this tick's composed transform
    Cached,
    /// Place each group at `local ⊖ reference`, leaving caches untouched
    ///
    /// For probing a hypothetical position before committing to it.
    Uncached { reference: &'a GyroVector<T> },
}

/// Resolve a sphere of radius `r` at `p` against `groups`
pub fn collide<'g, T, I>(
    curv: &Curvature,
    config: &CollisionConfig,
    groups: I,
    p: &Vector3<T>,
    r: T,
    mode: CacheMode<'_, T>,
) -> Hit<T>
where
    T: Real,
    I: IntoIterator<Item = (GroupHandle, &'g ColliderGroup<T>)>,
{
    let pad_r = r * real::<T>(config.ground_pad_ratio);
    let cull_dist_sq: T = real(config.spherical_cull_dist_sq);
    let mut hit = Hit::<T>::new();
    let mut p = *p;

    for (handle, group) in groups {
        if !group.is_active() {
            continue;
        }

        let placement = match mode {
            CacheMode::Cached => {
                // Far groups wrap around the sphere
                if curv.is_spherical() && group.composed().vec().norm_squared() > cull_dist_sq {
                    continue;
                }
                None
            }
            CacheMode::Uncached { reference } => Some(group.local().difference(curv, reference)),
        };

        for (index, collider) in group.colliders().iter().enumerate() {
            let offset = collider.offset();
            let closest = match &placement {
                None => {
                    if collider.distance_estimate(&p) + offset >= pad_r {
                        continue;
                    }
                    collider.closest_point(curv, &p)
                }
                Some(gv) => collider.closest_point_with(curv, &p, gv),
            };

            let delta = closest - p;
            if !delta.iter().all(|x| x.is_finite()) {
                debug_assert!(
                    false,
                    "non-finite contact from {} {index} in group {handle}",
                    collider.name()
                );
                warn!(
                    group = %handle,
                    collider = index,
                    shape = collider.name(),
                    "Skipping collider with non-finite contact"
                );
                continue;
            }

            let delta_mag = delta.norm() + offset;
            if delta_mag >= pad_r || delta_mag <= T::zero() {
                continue;
            }

            let sin_y = -delta.y / delta_mag;
            hit.max_sin_y_ground = hit.max_sin_y_ground.max(sin_y);

            if delta_mag < r {
                hit.displacement -= delta * ((r - delta_mag) / delta_mag);
                // Later colliders see the partially resolved point
                p += hit.displacement;
                hit.max_sin_y = hit.max_sin_y.max(sin_y);
                hit.min_sin_y = hit.min_sin_y.min(sin_y);
                hit.source = Some(HitSource {
                    group: handle,
                    collider: index,
                    owner: group.owner(),
                });
            }
        }
    }

    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{Collider, PlaneCollider, SphereCollider, TriangleCollider};
    use crate::registry::{GroupRegistry, OwnerId};
    use approx::assert_relative_eq;
    use warp_core::HeightMode;

    fn sphere(c: &Curvature, x: f32, r: f32) -> Collider<f32> {
        SphereCollider::new(c, &Vector3::new(x, 0.0, 0.0), r, HeightMode::Linear)
            .unwrap()
            .into()
    }

    fn registry_with(c: &Curvature, groups: Vec<Vec<Collider<f32>>>) -> GroupRegistry<f32> {
        let mut registry = GroupRegistry::new();
        for colliders in groups {
            let h = registry.register(ColliderGroup::new(
                colliders,
                OwnerId::new(),
                GyroVector::identity(),
            ));
            registry.update(c, h, &GyroVector::identity()).unwrap();
        }
        registry
    }

    fn run(
        c: &Curvature,
        registry: &GroupRegistry<f32>,
        p: Vector3<f32>,
        r: f32,
    ) -> Hit<f32> {
        collide(c, &CollisionConfig::default(), registry.iter(), &p, r, CacheMode::Cached)
    }

    #[test]
    fn test_push_out_of_sphere() {
        let c = Curvature::euclidean();
        let registry = registry_with(&c, vec![vec![sphere(&c, 0.0, 1.0)]]);

        let p = Vector3::new(0.5, 0.0, 0.0);
        let hit = run(&c, &registry, p, 0.6);
        assert!(hit.is_hit());
        assert_relative_eq!(hit.displacement, Vector3::new(-0.1, 0.0, 0.0), epsilon = 1e-6);

        // 0.6 clear of the surface, pushed back towards the centre
        let resolved = p + hit.displacement;
        assert_relative_eq!(1.0 - resolved.norm(), 0.6, epsilon = 1e-6);
        assert!(hit.displacement.dot(&p) < 0.0);
    }

    #[test]
    fn test_push_away_from_centre_outside() {
        let c = Curvature::euclidean();
        let registry = registry_with(&c, vec![vec![sphere(&c, 0.0, 1.0)]]);

        let p = Vector3::new(1.3, 0.0, 0.0);
        let hit = run(&c, &registry, p, 0.6);
        assert_relative_eq!(hit.displacement, Vector3::new(0.3, 0.0, 0.0), epsilon = 1e-6);
        assert!((p + hit.displacement).norm() >= 1.6 - 1e-6);
    }

    #[test]
    fn test_no_contact() {
        let c = Curvature::euclidean();
        let registry = registry_with(&c, vec![vec![sphere(&c, 0.0, 1.0)]]);
        let hit = run(&c, &registry, Vector3::new(3.0, 0.0, 0.0), 0.5);
        assert_eq!(hit, Hit::new());
    }

    #[test]
    fn test_ground_slope() {
        let c = Curvature::euclidean();
        let floor = TriangleCollider::new(
            &c,
            &Vector3::new(-2.0, 0.0, -2.0),
            &Vector3::new(2.0, 0.0, -2.0),
            &Vector3::new(0.0, 0.0, 2.0),
            0.0,
            HeightMode::Linear,
        )
        .unwrap();
        let registry = registry_with(&c, vec![vec![floor.into()]]);

        // Resting inside the padding band: grounded, no push
        let hit = run(&c, &registry, Vector3::new(0.0, 0.503, 0.0), 0.5);
        assert_relative_eq!(hit.max_sin_y_ground, 1.0, epsilon = 1e-6);
        assert!(!hit.is_hit());

        // Sunk into the floor: pushed straight up
        let hit = run(&c, &registry, Vector3::new(0.0, 0.3, 0.0), 0.5);
        assert_relative_eq!(hit.displacement, Vector3::new(0.0, 0.2, 0.0), epsilon = 1e-6);
        assert_relative_eq!(hit.max_sin_y, 1.0, epsilon = 1e-6);
        assert_eq!(hit.min_sin_y, 0.0);
    }

    #[test]
    fn test_ceiling_slope_is_negative() {
        let c = Curvature::euclidean();
        let ceiling = TriangleCollider::new(
            &c,
            &Vector3::new(-2.0, 1.0, -2.0),
            &Vector3::new(2.0, 1.0, -2.0),
            &Vector3::new(0.0, 1.0, 2.0),
            0.0,
            HeightMode::Linear,
        )
        .unwrap();
        let registry = registry_with(&c, vec![vec![ceiling.into()]]);

        let hit = run(&c, &registry, Vector3::new(0.0, 0.7, 0.0), 0.5);
        assert_relative_eq!(hit.min_sin_y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(hit.displacement, Vector3::new(0.0, -0.2, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_skipped_groups_are_ignored() {
        let c = Curvature::euclidean();
        let mut registry = registry_with(&c, vec![vec![sphere(&c, 0.0, 1.0)]]);
        registry.deactivate_all();
        assert!(!run(&c, &registry, Vector3::new(0.5, 0.0, 0.0), 0.6).is_hit());
    }

    #[test]
    fn test_collider_order_is_observable() {
        let c = Curvature::euclidean();
        let left = || sphere(&c, -1.0, 1.0);
        let right = || sphere(&c, 1.0, 1.0);
        let p = Vector3::new(0.1, 0.3, 0.0);

        let ab = registry_with(&c, vec![vec![left(), right()]]);
        let ba = registry_with(&c, vec![vec![right(), left()]]);
        let hit_ab = run(&c, &ab, p, 0.5);
        let hit_ba = run(&c, &ba, p, 0.5);

        assert!(hit_ab.is_hit() && hit_ba.is_hit());
        assert!((hit_ab.displacement - hit_ba.displacement).norm() > 1e-3);
        assert_eq!(hit_ab.source.unwrap().collider, 1);
    }

    #[test]
    fn test_hit_attribution() {
        let c = Curvature::euclidean();
        let registry = registry_with(
            &c,
            vec![vec![sphere(&c, 5.0, 0.5)], vec![sphere(&c, 9.0, 0.5), sphere(&c, 0.0, 1.0)]],
        );
        let hit = run(&c, &registry, Vector3::new(0.5, 0.0, 0.0), 0.6);
        let source = hit.source.unwrap();
        let (handle, group) = registry.iter().nth(1).unwrap();
        assert_eq!(source.group, handle);
        assert_eq!(source.collider, 1);
        assert_eq!(source.owner, group.owner());
    }

    #[test]
    fn test_uncached_probe_leaves_cache_alone() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let local = GyroVector::from_vec(Vector3::new(0.3f32, 0.0, 0.0));
        let mut registry = GroupRegistry::new();
        let h = registry.register(ColliderGroup::new(
            vec![
                SphereCollider::new(&c, &Vector3::zeros(), 0.2, HeightMode::Linear)
                    .unwrap()
                    .into(),
            ],
            OwnerId::new(),
            local,
        ));
        // Cache built for a player standing at the origin
        registry.update(&c, h, &local).unwrap();
        let before = registry.get(h).unwrap().colliders()[0].clone();

        let config = CollisionConfig::default();
        let p = Vector3::new(0.01, 0.0, 0.0);
        let cached = collide(&c, &config, registry.iter(), &p, 0.05, CacheMode::Cached);
        assert!(!cached.is_hit());

        // Probe from a reference that puts the sphere right on top of the player
        let reference = GyroVector::from_vec(Vector3::new(0.3, 0.0, 0.0));
        let probe = collide(
            &c,
            &config,
            registry.iter(),
            &p,
            0.05,
            CacheMode::Uncached { reference: &reference },
        );
        assert!(probe.is_hit());
        assert_eq!(registry.get(h).unwrap().colliders()[0], before);
    }

    #[test]
    fn test_plane_blocks_in_hyperbolic_space() {
        let c = Curvature::from_tiling(5.0).unwrap();
        let wall = PlaneCollider::new(&c, &Vector3::new(0.5f32, 0.0, 0.0), HeightMode::TanK)
            .unwrap();
        let registry = registry_with(&c, vec![vec![wall.into()]]);

        let (_, group) = registry.iter().next().unwrap();
        let surface = group.colliders()[0].closest_point(&c, &Vector3::zeros());
        let p = Vector3::new(surface.x - 0.02, 0.0, 0.0);
        let hit = run(&c, &registry, p, 0.05);
        assert!(hit.is_hit());
        assert!(hit.displacement.x < 0.0);
        assert_relative_eq!(hit.max_sin_y, 0.0, epsilon = 1e-6);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "non-finite contact")]
    fn test_nan_asserts_in_debug() {
        let c = Curvature::euclidean();
        let mut registry = registry_with(&c, vec![vec![sphere(&c, 0.0, 1.0)]]);
        let h = registry.iter().next().unwrap().0;
        let broken = GyroVector::from_vec(Vector3::new(f32::NAN, 0.0, 0.0));
        registry.update(&c, h, &broken).unwrap();
        run(&c, &registry, Vector3::new(0.5, 0.0, 0.0), 0.6);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_nan_collider_skipped_in_release() {
        let c = Curvature::euclidean();
        let mut registry =
            registry_with(&c, vec![vec![sphere(&c, 3.0, 1.0)], vec![sphere(&c, 0.0, 1.0)]]);
        let h = registry.iter().next().unwrap().0;
        let broken = GyroVector::from_vec(Vector3::new(f32::NAN, 0.0, 0.0));
        registry.update(&c, h, &broken).unwrap();

        let hit = run(&c, &registry, Vector3::new(0.5, 0.0, 0.0), 0.6);
        assert!(hit.displacement.iter().all(|x| x.is_finite()));
        assert_relative_eq!(hit.displacement, Vector3::new(-0.1, 0.0, 0.0), epsilon = 1e-6);
    }
}
