//! NPC interaction engine: Interactants, archetypes, dialogue, and the registry

pub mod archetype;
pub mod dialogue;
pub mod registry;
pub mod spawn;
pub mod view_lock;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use mystic_core::{EntityId, Pose, TaskHandle, Tick};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::world::BodyHandle;
use archetype::Archetype;
use dialogue::{NarrativeAnimator, QuestionAnimator};

/// Unique identifier for an Interactant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InteractantId(pub Uuid);

impl InteractantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the textual form shown by the active list
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text.trim()).ok().map(Self)
    }
}

impl Default for InteractantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InteractantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase. Moves forward only; `Despawned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Spawned,
    Approaching,
    AwaitingChoice,
    StoryPlaying,
    Rejecting,
    Despawned,
}

impl Phase {
    /// Conversations take precedence over the distance timeout
    pub fn is_conversing(self) -> bool {
        matches!(self, Phase::AwaitingChoice | Phase::StoryPlaying)
    }
}

/// Text currently being animated onto the target's display
#[derive(Debug, Clone)]
pub enum Script {
    Question(QuestionAnimator),
    Narrative(NarrativeAnimator),
}

/// A live NPC bound to one target
#[derive(Debug, Clone)]
pub struct Interactant {
    pub id: InteractantId,
    pub archetype: Archetype,
    pub target: EntityId,
    pub body: BodyHandle,
    /// Last pose read back from the world
    pub pose: Pose,
    pub phase: Phase,
    pub spawned_at: Tick,
    /// Proximity notification already sent
    pub notified_target: bool,
    pub quest_granted: bool,
    pub approach_steps: u32,
    pub retreat_steps: u32,
    /// Approach or retreat walk
    pub(crate) motion_task: Option<TaskHandle>,
    /// Dialogue animator, or the one-shot that follows it
    pub(crate) dialogue_task: Option<TaskHandle>,
    pub(crate) timeout_task: Option<TaskHandle>,
    pub(crate) script: Option<Script>,
}

impl Interactant {
    pub fn new(
        archetype: Archetype,
        target: EntityId,
        body: BodyHandle,
        pose: Pose,
        spawned_at: Tick,
    ) -> Self {
        Self {
            id: InteractantId::new(),
            archetype,
            target,
            body,
            pose,
            phase: Phase::Spawned,
            spawned_at,
            notified_target: false,
            quest_granted: false,
            approach_steps: 0,
            retreat_steps: 0,
            motion_task: None,
            dialogue_task: None,
            timeout_task: None,
            script: None,
        }
    }

    /// Row for the active list
    pub fn summary(&self) -> InteractantSummary {
        InteractantSummary {
            id: self.id.to_string(),
            archetype: self.archetype.key.clone(),
            name: self.archetype.name.clone(),
            target: self.target.to_string(),
            phase: self.phase,
            spawned_at: self.spawned_at,
            position: self.pose.position.to_array(),
        }
    }
}

/// Row of the administrative active list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractantSummary {
    pub id: String,
    pub archetype: String,
    pub name: String,
    pub target: String,
    pub phase: Phase,
    /// Tick the NPC appeared on
    pub spawned_at: Tick,
    pub position: [f32; 3],
}
