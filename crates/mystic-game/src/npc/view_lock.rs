//! View lock: holds a target in place facing the NPC during a conversation

use std::collections::HashMap;

use glam::Vec3;
use mystic_core::{EntityId, Pose};

use crate::npc::InteractantId;
use crate::world::{MovementParams, StatusEffect, StatusKind, WorldAdapter};

/// Lock effects last this long and are refreshed on every lock call
pub const LOCK_EFFECT_TICKS: u32 = 40;
const SLOWNESS_AMPLIFIER: u8 = 100;
const JUMP_DAMPENING_AMPLIFIER: u8 = 128;
const BLINDNESS_AMPLIFIER: u8 = 1;
/// Restorative boost granted on release
pub const RELEASE_BOOST_TICKS: u32 = 5;

/// State captured when a lock is first taken
#[derive(Debug, Clone, Copy)]
struct LockRecord {
    owner: InteractantId,
    captured: Pose,
    baseline: MovementParams,
}

/// At most one lock per target
#[derive(Debug, Default)]
pub struct ViewLocks {
    locks: HashMap<EntityId, LockRecord>,
}

impl ViewLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, target: EntityId) -> bool {
        self.locks.contains_key(&target)
    }

    pub fn owner(&self, target: EntityId) -> Option<InteractantId> {
        self.locks.get(&target).map(|record| record.owner)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Lock `target` facing `focus` on behalf of `owner`.
    ///
    /// The first call captures the target's pose and movement; every call
    /// re-applies the captured position, the facing and the timed effects.
    /// Returns `false` if another Interactant holds the lock or the target is
    /// gone.
    pub fn lock<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        target: EntityId,
        owner: InteractantId,
        focus: Vec3,
    ) -> bool {
        let record = match self.locks.get(&target) {
            Some(record) if record.owner != owner => return false,
            Some(record) => *record,
            None => {
                let Some(captured) = world.target_pose(target) else {
                    return false;
                };
                let record = LockRecord {
                    owner,
                    captured,
                    baseline: world.movement(target),
                };
                self.locks.insert(target, record);
                record
            }
        };

        world.teleport_target(target, Pose::from_position(record.captured.position).looking_at(focus));

        world.apply_status(
            target,
            StatusEffect::new(StatusKind::Slowness, LOCK_EFFECT_TICKS, SLOWNESS_AMPLIFIER),
        );
        world.apply_status(
            target,
            StatusEffect::new(StatusKind::JumpDampening, LOCK_EFFECT_TICKS, JUMP_DAMPENING_AMPLIFIER),
        );
        world.apply_status(
            target,
            StatusEffect::new(StatusKind::Blindness, LOCK_EFFECT_TICKS, BLINDNESS_AMPLIFIER),
        );
        world.set_movement(
            target,
            MovementParams {
                walk_speed: 0.0,
                invulnerable: true,
                ..record.baseline
            },
        );
        true
    }

    /// Release `target` if `owner` holds its lock. No-op otherwise.
    pub fn unlock<W: WorldAdapter + ?Sized>(
        &mut self,
        world: &mut W,
        target: EntityId,
        owner: InteractantId,
    ) -> bool {
        match self.locks.get(&target) {
            Some(record) if record.owner == owner => self.release(world, target),
            _ => false,
        }
    }

    /// Release `target` regardless of owner. Returns `false` if nothing was held.
    pub fn release<W: WorldAdapter + ?Sized>(&mut self, world: &mut W, target: EntityId) -> bool {
        let Some(record) = self.locks.remove(&target) else {
            return false;
        };
        for kind in StatusKind::LOCK_EFFECTS {
            world.clear_status(target, kind);
        }
        world.set_movement(target, record.baseline);
        world.apply_status(
            target,
            StatusEffect::new(StatusKind::Speed, RELEASE_BOOST_TICKS, 1),
        );
        true
    }

    /// Release every lock, returning how many were held
    pub fn release_all<W: WorldAdapter + ?Sized>(&mut self, world: &mut W) -> usize {
        let targets: Vec<EntityId> = self.locks.keys().copied().collect();
        targets
            .into_iter()
            .filter(|target| self.release(world, *target))
            .count()
    }
}
