//! Mystic Game - NPC interaction engine
//!
//! Spawns transient NPCs near targets, walks them in, runs the typed
//! question/choice dialogue and resolves it to a quest grant, a rejection or
//! a timeout. The platform is reached only through the traits in [`world`].

pub mod chat;
pub mod config;
pub mod effects;
pub mod error;
pub mod npc;
pub mod world;

pub use chat::{classify, ChatInbox, ChatMessage, ChatResponse, ChatSender};
pub use config::{
    ArchetypeConfig, ArchetypeConfigs, EngineConfig, MessagesConfig, NotificationConfig,
};
pub use effects::Effect;
pub use error::{AdminError, SpawnError};
pub use npc::archetype::{Archetype, ArchetypeTable};
pub use npc::registry::NpcRegistry;
pub use npc::view_lock::ViewLocks;
pub use npc::{Interactant, InteractantId, InteractantSummary, Phase};
pub use world::{
    BodyHandle, Messenger, MovementParams, QuestGranter, StatusEffect, StatusKind, WorldAdapter,
};
