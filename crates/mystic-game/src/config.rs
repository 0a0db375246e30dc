//! Engine configuration
//!
//! All cadence values are in ticks at the reference rate of 20 ticks per
//! second unless the field name says seconds.

use std::collections::BTreeMap;

use mystic_core::TickConfig;
use serde::{Deserialize, Serialize};

/// Scalars that drive spawning, approach, dialogue and dismissal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between spawn sweeps
    pub spawn_interval_secs: u32,
    /// Seconds after spawning before an unengaged NPC gives up
    pub despawn_time_secs: u32,
    /// Chance (0-100) that a sweep spawns an NPC for an eligible target
    pub spawn_chance_percent: u32,
    /// Distance from the target at which NPCs appear
    pub spawn_distance: f32,
    /// Random bearings tried before a spawn is abandoned
    pub spawn_attempts: u32,
    /// Beyond this distance a non-conversing NPC times out
    pub abandon_radius: f32,
    /// Max distance at which the target's view is locked
    pub engagement_radius: f32,
    /// Distance at which the approach ends and the offer starts
    pub approach_radius: f32,
    /// Approach walk firings before giving up
    pub approach_step_budget: u32,
    /// Ticks between registry update sweeps
    pub update_period_ticks: u64,
    /// Ticks between approach walk steps
    pub approach_period_ticks: u64,
    /// Ticks between dialogue animator firings
    pub dialogue_period_ticks: u64,
    /// Animator firings the full question stays up before the choice shows
    pub question_hold_firings: u32,
    /// Story characters shown next to the accept/reject prompt
    pub choice_text_budget: usize,
    /// Ticks between the end of the acceptance narrative and the quest grant
    pub post_story_dwell_ticks: u64,
    /// Ticks between the quest grant and the NPC vanishing
    pub accept_despawn_delay_ticks: u64,
    /// Backward steps walked when dismissed
    pub retreat_steps: u32,
    /// Ticks between backward steps
    pub retreat_period_ticks: u64,
    /// Log admission failures and spawns
    pub debug: bool,
    pub notification: NotificationConfig,
    pub clock: TickConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spawn_interval_secs: 300,
            despawn_time_secs: 60,
            spawn_chance_percent: 30,
            spawn_distance: 10.0,
            spawn_attempts: 20,
            abandon_radius: 30.0,
            engagement_radius: 5.0,
            approach_radius: 2.0,
            approach_step_budget: 30,
            update_period_ticks: 10,
            approach_period_ticks: 10,
            dialogue_period_ticks: 2,
            question_hold_firings: 100,
            choice_text_budget: 40,
            post_story_dwell_ticks: 40,
            accept_despawn_delay_ticks: 60,
            retreat_steps: 10,
            retreat_period_ticks: 5,
            debug: false,
            notification: NotificationConfig::default(),
            clock: TickConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn spawn_interval_ticks(&self) -> u64 {
        self.clock.seconds_to_ticks(self.spawn_interval_secs as f32)
    }

    pub fn despawn_time_ticks(&self) -> u64 {
        self.clock.seconds_to_ticks(self.despawn_time_secs as f32)
    }
}

/// Proximity notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Cue name, resolved through [`crate::effects::Effect::from_name`]
    pub sound: String,
    pub particles: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: "villager_ambient".to_string(),
            particles: true,
        }
    }
}

/// Player-facing texts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Prepended to chat-log messages
    pub prefix: String,
    pub quest_declined: String,
    pub quest_timeout: String,
    pub quest_accepted: String,
    /// Narrative typed out after the target accepts
    pub quest_accepted_story: String,
    pub choice_prompt: String,
    pub unstuck: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            prefix: "[MysticQuest] ".to_string(),
            quest_declined: "*The figure looks disappointed and backs away into the shadows*".to_string(),
            quest_timeout: "*The mysterious figure loses interest and disappears into the shadows*".to_string(),
            quest_accepted: "*The figure nods approvingly* You have chosen wisely.".to_string(),
            quest_accepted_story: "Thank you for accepting. Your quest awaits...".to_string(),
            choice_prompt: "/accept or /reject".to_string(),
            unstuck: "You have been unstuck!".to_string(),
        }
    }
}

impl MessagesConfig {
    /// Chat-log form of a message
    pub fn chat(&self, text: &str) -> String {
        format!("{}{}", self.prefix, text)
    }
}

/// One NPC type as written in configuration. Every field is optional so a
/// half-written entry still loads; gaps are filled by the archetype table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeConfig {
    pub name: Option<String>,
    pub story: Option<String>,
    pub quest_types: Vec<String>,
    /// Base64 skin texture
    pub skin: Option<String>,
}

/// Archetype entries keyed by archetype id
pub type ArchetypeConfigs = BTreeMap<String, ArchetypeConfig>;
