//! Collider group registry
//!
//! Groups live in slots addressed by generation-checked handles. Removing a
//! group bumps its slot's generation, so a handle kept past removal is
//! rejected instead of silently addressing whatever reuses the slot.
//!
//! ```text
//!   slot:        0        1        2
//!   generation:  3        0        1
//!   group:     Some(..)  None    Some(..)     free list: [1]
//! ```

use crate::collider::Collider;
use crate::error::{CollideError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::debug;
use uuid::Uuid;
use warp_core::{Curvature, GyroVector, Real};

/// Identifies the object that owns a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    /// Create a new random owner ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to a registered group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupHandle {
    index: u32,
    generation: u32,
}

impl GroupHandle {
    /// Slot index, stable for the lifetime of the group
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for GroupHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// The colliders of one object
#[derive(Debug, Clone)]
pub struct ColliderGroup<T: Real> {
    colliders: Vec<Collider<T>>,
    owner: OwnerId,
    skip: bool,
    /// The owner's own transform, for uncached queries
    local: GyroVector<T>,
    /// The transform the caches were last built with
    composed: GyroVector<T>,
}

impl<T: Real> ColliderGroup<T> {
    pub fn new(colliders: Vec<Collider<T>>, owner: OwnerId, local: GyroVector<T>) -> Self {
        Self {
            colliders,
            owner,
            skip: true,
            local,
            composed: GyroVector::identity(),
        }
    }

    pub fn colliders(&self) -> &[Collider<T>] {
        &self.colliders
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Whether queries currently see this group
    pub fn is_active(&self) -> bool {
        !self.skip
    }

    pub fn local(&self) -> &GyroVector<T> {
        &self.local
    }

    pub fn composed(&self) -> &GyroVector<T> {
        &self.composed
    }

    /// Rebuild every collider cache under `composed`
    pub fn update(&mut self, curv: &Curvature, composed: &GyroVector<T>) {
        for collider in &mut self.colliders {
            collider.update_cache(curv, composed);
        }
        self.composed = *composed;
    }
}

#[derive(Debug, Clone)]
struct Slot<T: Real> {
    generation: u32,
    group: Option<ColliderGroup<T>>,
}

/// Registry of collider groups
#[derive(Debug, Clone)]
pub struct GroupRegistry<T: Real> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T: Real> GroupRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Register a group
    ///
    /// New groups start inactive; they join queries after their first
    /// [`GroupRegistry::update`] or an explicit [`GroupRegistry::set_active`].
    pub fn register(&mut self, group: ColliderGroup<T>) -> GroupHandle {
        let colliders = group.colliders.len();
        let owner = group.owner;

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.group = Some(group);
                GroupHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    group: Some(group),
                });
                GroupHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.len += 1;

        debug!(group = %handle, %owner, colliders, "Registered collider group");
        handle
    }

    /// Remove a group, returning it
    pub fn unregister(&mut self, handle: GroupHandle) -> Result<ColliderGroup<T>> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation && slot.group.is_some())
            .ok_or(CollideError::StaleHandle(handle))?;

        let group = slot.group.take().ok_or(CollideError::StaleHandle(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;

        debug!(group = %handle, owner = %group.owner, "Unregistered collider group");
        Ok(group)
    }

    pub fn get(&self, handle: GroupHandle) -> Result<&ColliderGroup<T>> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.group.as_ref())
            .ok_or(CollideError::StaleHandle(handle))
    }

    pub fn get_mut(&mut self, handle: GroupHandle) -> Result<&mut ColliderGroup<T>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.group.as_mut())
            .ok_or(CollideError::StaleHandle(handle))
    }

    pub fn contains(&self, handle: GroupHandle) -> bool {
        self.get(handle).is_ok()
    }

    /// Show or hide a group from queries
    pub fn set_active(&mut self, handle: GroupHandle, active: bool) -> Result<()> {
        self.get_mut(handle)?.skip = !active;
        Ok(())
    }

    pub fn deactivate(&mut self, handle: GroupHandle) -> Result<()> {
        self.set_active(handle, false)
    }

    /// Hide every group until its next update
    pub fn deactivate_all(&mut self) {
        for group in self.slots.iter_mut().filter_map(|s| s.group.as_mut()) {
            group.skip = true;
        }
    }

    /// Rebuild a group's caches under `composed` and activate it
    pub fn update(
        &mut self,
        curv: &Curvature,
        handle: GroupHandle,
        composed: &GyroVector<T>,
    ) -> Result<()> {
        let group = self.get_mut(handle)?;
        group.update(curv, composed);
        group.skip = false;
        Ok(())
    }

    /// Replace the owner's own transform
    pub fn set_local(&mut self, handle: GroupHandle, local: GyroVector<T>) -> Result<()> {
        self.get_mut(handle)?.local = local;
        Ok(())
    }

    /// Live groups in slot order
    pub fn iter(&self) -> impl Iterator<Item = (GroupHandle, &ColliderGroup<T>)> {
        self.iter_slots(0..self.slots.len())
    }

    /// Live groups whose slot index falls in `range`, in slot order
    pub fn iter_slots(
        &self,
        range: Range<usize>,
    ) -> impl Iterator<Item = (GroupHandle, &ColliderGroup<T>)> {
        let end = range.end.min(self.slots.len());
        let start = range.start.min(end);
        self.slots[start..end]
            .iter()
            .enumerate()
            .filter_map(move |(i, slot)| {
                let handle = GroupHandle {
                    index: (start + i) as u32,
                    generation: slot.generation,
                };
                slot.group.as_ref().map(|group| (handle, group))
            })
    }

    /// Number of live groups
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total colliders across live groups
    pub fn collider_count(&self) -> usize {
        self.iter().map(|(_, g)| g.colliders.len()).sum()
    }

    /// Drop every group and invalidate every handle
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.group.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        // Hand out low slots first
        self.free.reverse();
        self.len = 0;
        debug!("Cleared collider registry");
    }
}

impl<T: Real> Default for GroupRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
