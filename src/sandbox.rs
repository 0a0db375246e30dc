//! In-memory world for running the engine headless
//!
//! Flat terrain with a few pillars, targets that amble around, and
//! collaborators that log what the engine asks of them.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use mystic_core::{EntityId, Pose};
use mystic_game::{
    Archetype, BodyHandle, Effect, Messenger, MovementParams, QuestGranter, StatusEffect,
    StatusKind, WorldAdapter,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Pillar radius around each obstacle column
const PILLAR_RADIUS: f32 = 1.5;
/// Distance a body covers per move command at speed 1
const BODY_STRIDE: f32 = 0.8;

struct SandboxTarget {
    name: String,
    pose: Pose,
    movement: MovementParams,
    statuses: HashMap<StatusKind, StatusEffect>,
}

impl SandboxTarget {
    fn frozen(&self) -> bool {
        self.statuses.values().any(|s| s.prevents_movement())
    }
}

pub struct SandboxWorld {
    targets: BTreeMap<EntityId, SandboxTarget>,
    bodies: HashMap<BodyHandle, Pose>,
    pillars: Vec<Vec3>,
    next_body: u64,
    rng: StdRng,
}

impl SandboxWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            targets: BTreeMap::new(),
            bodies: HashMap::new(),
            pillars: vec![Vec3::new(6.0, 0.0, 6.0), Vec3::new(-8.0, 0.0, 3.0)],
            next_body: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn add_target(&mut self, name: &str, position: Vec3) -> EntityId {
        let id = EntityId::new();
        self.targets.insert(
            id,
            SandboxTarget {
                name: name.to_string(),
                pose: Pose::from_position(position),
                movement: MovementParams::default(),
                statuses: HashMap::new(),
            },
        );
        id
    }

    pub fn target_name(&self, target: EntityId) -> Option<&str> {
        self.targets.get(&target).map(|t| t.name.as_str())
    }

    /// Advance timed effects and let unfrozen targets drift one tick
    pub fn step(&mut self) {
        for target in self.targets.values_mut() {
            target.statuses.retain(|_, status| {
                status.duration_ticks = status.duration_ticks.saturating_sub(1);
                status.duration_ticks > 0
            });
            if target.frozen() || target.movement.walk_speed <= 0.0 {
                continue;
            }
            let drift = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                0.0,
                self.rng.gen_range(-1.0..=1.0),
            );
            target.pose.position += drift * target.movement.walk_speed * 0.1;
        }
    }
}

impl WorldAdapter for SandboxWorld {
    fn online_targets(&self) -> Vec<EntityId> {
        self.targets.keys().copied().collect()
    }

    fn target_pose(&self, target: EntityId) -> Option<Pose> {
        self.targets.get(&target).map(|t| t.pose)
    }

    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }

    fn is_position_clear(&self, position: Vec3) -> bool {
        self.pillars.iter().all(|pillar| {
            Vec3::new(position.x - pillar.x, 0.0, position.z - pillar.z).length() > PILLAR_RADIUS
        })
    }

    fn spawn_entity(&mut self, archetype: &Archetype, pose: Pose) -> Option<BodyHandle> {
        let body = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(body, pose);
        info!("{} appears at {:?}", archetype.name, pose.position);
        Some(body)
    }

    fn destroy_entity(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
    }

    fn entity_pose(&self, body: BodyHandle) -> Option<Pose> {
        self.bodies.get(&body).copied()
    }

    fn move_to(&mut self, body: BodyHandle, destination: Vec3, speed: f32) {
        if let Some(pose) = self.bodies.get_mut(&body) {
            let delta = destination - pose.position;
            let length = delta.length();
            if length > f32::EPSILON {
                pose.position += delta / length * (BODY_STRIDE * speed).min(length);
            }
        }
    }

    fn set_facing(&mut self, body: BodyHandle, yaw: f32, pitch: f32) {
        if let Some(pose) = self.bodies.get_mut(&body) {
            pose.yaw = yaw;
            pose.pitch = pitch;
        }
    }

    fn play_effect(&mut self, effect: Effect, position: Vec3) {
        debug!("effect {} at {:?}", effect.name(), position);
    }

    fn teleport_target(&mut self, target: EntityId, pose: Pose) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.pose = pose;
        }
    }

    fn movement(&self, target: EntityId) -> MovementParams {
        self.targets
            .get(&target)
            .map(|t| t.movement)
            .unwrap_or_default()
    }

    fn set_movement(&mut self, target: EntityId, params: MovementParams) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.movement = params;
        }
    }

    fn apply_status(&mut self, target: EntityId, effect: StatusEffect) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.statuses.insert(effect.kind, effect);
        }
    }

    fn clear_status(&mut self, target: EntityId, kind: StatusKind) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.statuses.remove(&kind);
        }
    }
}

/// Prints the action bar only when it changes, and every chat line
#[derive(Default)]
pub struct LogMessenger {
    last_notice: HashMap<EntityId, String>,
}

impl Messenger for LogMessenger {
    fn notify(&mut self, target: EntityId, text: &str) {
        if self.last_notice.get(&target).map(String::as_str) == Some(text) {
            return;
        }
        debug!("[{}] {}", target, text);
        self.last_notice.insert(target, text.to_string());
    }

    fn send_chat(&mut self, target: EntityId, text: &str) {
        info!("[{}] {}", target, text);
    }
}

/// Remembers granted quests
#[derive(Default)]
pub struct QuestLog {
    pub grants: Vec<(EntityId, String)>,
}

impl QuestGranter for QuestLog {
    fn grant_quest(&mut self, target: EntityId, archetype: &Archetype) {
        let quest = archetype
            .quest_types
            .first()
            .cloned()
            .unwrap_or_else(|| "mystery".to_string());
        info!("Granting quest '{}' to {}", quest, target);
        self.grants.push((target, quest));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pillars_block_spawns() {
        let world = SandboxWorld::new(0);
        assert!(!world.is_position_clear(Vec3::new(6.5, 1.0, 6.0)));
        assert!(world.is_position_clear(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_frozen_target_stays_put() {
        let mut world = SandboxWorld::new(0);
        let target = world.add_target("a", Vec3::ZERO);
        world.apply_status(target, StatusEffect::new(StatusKind::Slowness, 3, 100));
        world.step();
        assert_eq!(world.target_pose(target).map(|p| p.position), Some(Vec3::ZERO));

        world.step();
        world.step();
        world.step();
        assert_ne!(world.target_pose(target).map(|p| p.position), Some(Vec3::ZERO));
    }
}
