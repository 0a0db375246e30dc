//! Collaborator boundary: the platform the engine drives
//!
//! The engine never touches the game world directly. Spawning bodies,
//! moving them, freezing targets and playing cues all go through these
//! traits so the host can plug in its own world.

use glam::Vec3;
use mystic_core::{EntityId, Pose};
use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::npc::archetype::Archetype;

/// Handle to an NPC body owned by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// A target's movement parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementParams {
    pub walk_speed: f32,
    pub fly_speed: f32,
    pub invulnerable: bool,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            walk_speed: 0.2,
            fly_speed: 0.1,
            invulnerable: false,
        }
    }
}

/// Timed effects the engine applies to targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Horizontal movement suppression
    Slowness,
    /// Upward-motion dampening
    JumpDampening,
    /// Short vision impairment
    Blindness,
    /// Restorative boost granted on release
    Speed,
}

impl StatusKind {
    /// The kinds a view lock applies
    pub const LOCK_EFFECTS: [StatusKind; 3] =
        [StatusKind::Slowness, StatusKind::JumpDampening, StatusKind::Blindness];
}

/// A timed status effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Remaining duration in ticks
    pub duration_ticks: u32,
    pub amplifier: u8,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration_ticks: u32, amplifier: u8) -> Self {
        Self {
            kind,
            duration_ticks,
            amplifier,
        }
    }

    /// Whether this effect keeps the target in place
    pub fn prevents_movement(&self) -> bool {
        matches!(self.kind, StatusKind::Slowness | StatusKind::JumpDampening)
    }
}

/// World and platform operations
pub trait WorldAdapter {
    /// Targets currently connected and eligible for NPCs
    fn online_targets(&self) -> Vec<EntityId>;

    /// Current pose of a target; `None` once it disconnected
    fn target_pose(&self, target: EntityId) -> Option<Pose>;

    /// Surface height at a column, used to place spawns on the ground
    fn ground_height(&self, x: f32, z: f32) -> f32;

    /// Clear of solid geometry and not submerged
    fn is_position_clear(&self, position: Vec3) -> bool;

    /// Create an NPC body. `None` if the platform refused.
    fn spawn_entity(&mut self, archetype: &Archetype, pose: Pose) -> Option<BodyHandle>;

    fn destroy_entity(&mut self, body: BodyHandle);

    /// Current pose of a body, if it still exists
    fn entity_pose(&self, body: BodyHandle) -> Option<Pose>;

    /// Walk a body toward `destination` at a speed multiplier
    fn move_to(&mut self, body: BodyHandle, destination: Vec3, speed: f32);

    /// Turn a body in place
    fn set_facing(&mut self, body: BodyHandle, yaw: f32, pitch: f32);

    fn play_effect(&mut self, effect: Effect, position: Vec3);

    /// Force a target's pose
    fn teleport_target(&mut self, target: EntityId, pose: Pose);

    fn movement(&self, target: EntityId) -> MovementParams;

    fn set_movement(&mut self, target: EntityId, params: MovementParams);

    /// Apply or refresh a timed effect
    fn apply_status(&mut self, target: EntityId, effect: StatusEffect);

    fn clear_status(&mut self, target: EntityId, kind: StatusKind);
}

/// Transient display and persistent chat log
pub trait Messenger {
    /// Transient display surface (action bar)
    fn notify(&mut self, target: EntityId, text: &str);

    /// Persistent log-style message
    fn send_chat(&mut self, target: EntityId, text: &str);
}

/// Quest bookkeeping, consulted only when an offer is accepted
pub trait QuestGranter {
    fn grant_quest(&mut self, target: EntityId, archetype: &Archetype);
}
