//! High-precision world frame and object placement
//!
//! The player never moves. Instead the whole world is moved by the inverse
//! of the player's motion, accumulated tick after tick into one
//! `GyroVector`. That accumulation is the only place where rounding error
//! compounds without bound, so it always runs in `f64`. Per-object
//! composition is one step deep and runs in `f32`, except for objects that
//! opt into the double-precision path.
//!
//! ```text
//!   WorldFrame (f64) ──to_f32──► world
//!   Placement.local ⊕ world ───► composed transform (f32, per object)
//! ```

use crate::convert::{HeightMode, unit_to_poincare};
use crate::curvature::Curvature;
use crate::domain::guard_in_ball;
use crate::gyrovector::GyroVector;
use nalgebra::{UnitQuaternion, Vector3};

/// The accumulated world transform
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldFrame {
    world: GyroVector<f64>,
    mirror: GyroVector<f32>,
}

impl WorldFrame {
    /// Frame at the world origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame with the player standing at Poincaré point `start`
    pub fn starting_at(start: Vector3<f64>) -> Self {
        let mut frame = Self::new();
        frame.set_f64(GyroVector::from_vec(-start));
        frame
    }

    /// Single-precision copy for per-object composition
    pub fn get(&self) -> &GyroVector<f32> {
        &self.mirror
    }

    pub fn get_f64(&self) -> &GyroVector<f64> {
        &self.world
    }

    pub fn set(&mut self, gv: GyroVector<f32>) {
        self.world = gv.to_f64();
        self.mirror = gv;
    }

    pub fn set_f64(&mut self, gv: GyroVector<f64>) {
        self.mirror = gv.to_f32();
        self.world = gv;
    }

    /// Move the player by `displacement`, in the player's local frame
    ///
    /// The world moves the opposite way.
    pub fn advance(&mut self, curv: &Curvature, displacement: &Vector3<f32>) {
        let next = self
            .world
            .translate_back(curv, &displacement.cast::<f64>())
            .renormalized();
        let vec = guard_in_ball(curv, next.vec());
        self.set_f64(next.with_vec(vec));
    }

    /// Like [`WorldFrame::advance`], but keeps the player on or above the
    /// ground plane and re-aligns "up"
    pub fn advance_grounded(&mut self, curv: &Curvature, displacement: &Vector3<f32>) {
        let next = self
            .world
            .translate_back(curv, &displacement.cast::<f64>())
            .renormalized();
        let mut vec = guard_in_ball(curv, next.vec());
        vec.y = vec.y.min(0.0);
        let mut next = next.with_vec(vec);
        next.align_up_vector(curv);
        self.set_f64(next);
    }
}

/// Invisible wall at a fixed Poincaré radius over a range of headings
///
/// Headings are `atan2(z, x)` of the player's position relative to the world
/// origin, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcLimit {
    pub arc_min: f64,
    pub arc_max: f64,
    pub radius_sq: f64,
}

impl Default for ArcLimit {
    fn default() -> Self {
        Self {
            arc_min: 0.0,
            arc_max: 0.0,
            radius_sq: 0.97,
        }
    }
}

impl WorldFrame {
    /// Pull the player back onto the wall if they crossed it
    ///
    /// Returns whether the frame was clamped. Rotation is left untouched.
    pub fn limit_arc(&mut self, limit: &ArcLimit) -> bool {
        let vec = *self.world.vec();
        let mag_sq = vec.norm_squared();
        if mag_sq <= limit.radius_sq {
            return false;
        }
        let heading = (-vec.z).atan2(-vec.x);
        if heading < limit.arc_min || heading > limit.arc_max {
            return false;
        }
        let clamped = vec * (limit.radius_sq / mag_sq).sqrt();
        self.set_f64(self.world.with_vec(clamped));
        true
    }
}

/// An object's own transform in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    local: GyroVector<f32>,
    local_f64: Option<GyroVector<f64>>,
    height: HeightMode,
}

impl Placement {
    pub fn new(local: GyroVector<f32>) -> Self {
        Self {
            local,
            local_f64: None,
            height: HeightMode::default(),
        }
    }

    /// Compose through the `f64` path
    ///
    /// Used for large static geometry far from the origin, where `f32`
    /// composition visibly jitters.
    pub fn with_high_precision(mut self, enabled: bool) -> Self {
        self.local_f64 = enabled.then(|| self.local.to_f64());
        self
    }

    pub fn with_height_mode(mut self, height: HeightMode) -> Self {
        self.height = height;
        self
    }

    pub fn local(&self) -> &GyroVector<f32> {
        &self.local
    }

    pub fn set_local(&mut self, local: GyroVector<f32>) {
        self.local = local;
        if self.local_f64.is_some() {
            self.local_f64 = Some(local.to_f64());
        }
    }

    pub fn height_mode(&self) -> HeightMode {
        self.height
    }

    pub fn is_high_precision(&self) -> bool {
        self.local_f64.is_some()
    }

    /// The object's composed transform for this tick: `local ⊕ world`
    pub fn compose(&self, curv: &Curvature, frame: &WorldFrame) -> GyroVector<f32> {
        match &self.local_f64 {
            Some(local) => local.compose(curv, frame.get_f64()).to_f32(),
            None => self.local.compose(curv, frame.get()),
        }
    }

    /// Unit-tile point on this object to its position as seen by the player
    pub fn world_to_hyper(
        &self,
        curv: &Curvature,
        frame: &WorldFrame,
        p: &Vector3<f32>,
    ) -> Vector3<f32> {
        self.compose(curv, frame)
            .apply(curv, &unit_to_poincare(curv, p, self.height))
    }

    /// Unit-tile point on this object to its position in world coordinates
    pub fn local_to_hyper(&self, curv: &Curvature, p: &Vector3<f32>) -> Vector3<f32> {
        self.local
            .apply(curv, &unit_to_poincare(curv, p, self.height))
    }

    /// Move a scene-graph rotation into the gyrovector, resetting it
    pub fn absorb_rotation(&mut self, scene_rotation: &mut UnitQuaternion<f32>) {
        self.set_local(self.local.pre_rotate(scene_rotation));
        *scene_rotation = UnitQuaternion::identity();
    }

    /// Move the gyrovector's rotation out into a scene-graph rotation
    pub fn extract_rotation(&mut self, scene_rotation: &mut UnitQuaternion<f32>) {
        let gyr = *self.local.gyr();
        *scene_rotation = gyr * *scene_rotation;
        self.set_local(self.local.pre_rotate(&gyr.inverse()));
    }
}
