//! Recording fakes for the collaborator traits

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use mystic_core::{EntityId, Pose};

use crate::effects::Effect;
use crate::npc::archetype::Archetype;
use crate::world::{
    BodyHandle, Messenger, MovementParams, QuestGranter, StatusEffect, StatusKind, WorldAdapter,
};

/// A connected target in the fake world
#[derive(Debug, Clone)]
pub struct FakeTarget {
    pub pose: Pose,
    pub movement: MovementParams,
    pub statuses: HashMap<StatusKind, StatusEffect>,
}

/// Flat world at height 0 where bodies walk `stride` units per move command
#[derive(Debug)]
pub struct FakeWorld {
    pub targets: BTreeMap<EntityId, FakeTarget>,
    pub bodies: HashMap<BodyHandle, Pose>,
    pub destroyed: Vec<BodyHandle>,
    pub effects: Vec<(Effect, Vec3)>,
    pub teleports: Vec<(EntityId, Pose)>,
    pub stride: f32,
    pub all_obstructed: bool,
    pub refuse_spawns: bool,
    pub clearance_checks: Cell<u32>,
    next_body: u64,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self {
            targets: BTreeMap::new(),
            bodies: HashMap::new(),
            destroyed: Vec::new(),
            effects: Vec::new(),
            teleports: Vec::new(),
            stride: 1.0,
            all_obstructed: false,
            refuse_spawns: false,
            clearance_checks: Cell::new(0),
            next_body: 1,
        }
    }

    pub fn add_target(&mut self, position: Vec3) -> EntityId {
        let id = EntityId::new();
        self.targets.insert(
            id,
            FakeTarget {
                pose: Pose::from_position(position),
                movement: MovementParams::default(),
                statuses: HashMap::new(),
            },
        );
        id
    }

    pub fn move_target(&mut self, target: EntityId, position: Vec3) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.pose.position = position;
        }
    }

    pub fn disconnect(&mut self, target: EntityId) {
        self.targets.remove(&target);
    }

    pub fn target(&self, target: EntityId) -> &FakeTarget {
        &self.targets[&target]
    }

    pub fn has_status(&self, target: EntityId, kind: StatusKind) -> bool {
        self.targets
            .get(&target)
            .map_or(false, |t| t.statuses.contains_key(&kind))
    }

    pub fn count_effect(&self, effect: Effect) -> usize {
        self.effects.iter().filter(|(e, _)| *e == effect).count()
    }
}

impl WorldAdapter for FakeWorld {
    fn online_targets(&self) -> Vec<EntityId> {
        self.targets.keys().copied().collect()
    }

    fn target_pose(&self, target: EntityId) -> Option<Pose> {
        self.targets.get(&target).map(|t| t.pose)
    }

    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }

    fn is_position_clear(&self, _position: Vec3) -> bool {
        self.clearance_checks.set(self.clearance_checks.get() + 1);
        !self.all_obstructed
    }

    fn spawn_entity(&mut self, _archetype: &Archetype, pose: Pose) -> Option<BodyHandle> {
        if self.refuse_spawns {
            return None;
        }
        let body = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(body, pose);
        Some(body)
    }

    fn destroy_entity(&mut self, body: BodyHandle) {
        if self.bodies.remove(&body).is_some() {
            self.destroyed.push(body);
        }
    }

    fn entity_pose(&self, body: BodyHandle) -> Option<Pose> {
        self.bodies.get(&body).copied()
    }

    fn move_to(&mut self, body: BodyHandle, destination: Vec3, _speed: f32) {
        if let Some(pose) = self.bodies.get_mut(&body) {
            let delta = destination - pose.position;
            let length = delta.length();
            if length > f32::EPSILON {
                pose.position += delta / length * self.stride.min(length);
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
        self.effects.push((effect, position));
    }

    fn teleport_target(&mut self, target: EntityId, pose: Pose) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.pose = pose;
            self.teleports.push((target, pose));
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

#[derive(Debug, Default)]
pub struct RecordingMessenger {
    pub notices: Vec<(EntityId, String)>,
    pub chats: Vec<(EntityId, String)>,
}

impl RecordingMessenger {
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.chats.is_empty()
    }
}

impl Messenger for RecordingMessenger {
    fn notify(&mut self, target: EntityId, text: &str) {
        self.notices.push((target, text.to_string()));
    }

    fn send_chat(&mut self, target: EntityId, text: &str) {
        self.chats.push((target, text.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingQuests {
    /// (target, archetype key)
    pub grants: Vec<(EntityId, String)>,
}

impl QuestGranter for RecordingQuests {
    fn grant_quest(&mut self, target: EntityId, archetype: &Archetype) {
        self.grants.push((target, archetype.key.clone()));
    }
}
