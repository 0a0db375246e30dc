//! Core types used throughout the Mystic engine

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for entities tracked by the engine (targets, NPCs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// World location plus facing.
///
/// Yaw and pitch are in degrees. Yaw 0 looks down +Z and grows clockwise
/// when seen from above, so a direction `(x, z)` has yaw `atan2(-x, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Pose {
    /// Create a pose at the given position facing yaw 0
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a pose with position and facing
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    /// Straight-line distance between two poses
    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }

    /// Horizontal (XZ-plane) distance between two poses
    pub fn horizontal_distance(&self, other: &Pose) -> f32 {
        let d = other.position - self.position;
        Vec3::new(d.x, 0.0, d.z).length()
    }

    /// Unit vector this pose is looking along
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(-yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos())
    }

    /// Same position, facing `target`. A zero-length direction keeps the
    /// current facing.
    pub fn looking_at(&self, target: Vec3) -> Pose {
        let direction = (target - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return *self;
        }
        let (yaw, pitch) = facing_angles(direction);
        Pose {
            position: self.position,
            yaw,
            pitch,
        }
    }
}

/// Yaw and pitch (degrees) for a normalized direction
pub fn facing_angles(direction: Vec3) -> (f32, f32) {
    let yaw = (-direction.x).atan2(direction.z).to_degrees();
    let pitch = direction.y.clamp(-1.0, 1.0).asin().to_degrees();
    (yaw, pitch)
}
