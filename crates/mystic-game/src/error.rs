use mystic_core::EntityId;
use thiserror::Error;

/// Why a spawn attempt did not produce an NPC. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("target {0} already has an active NPC")]
    TargetEngaged(EntityId),

    #[error("target {0} is not online")]
    TargetOffline(EntityId),

    #[error("no NPC archetypes are configured")]
    NoArchetypes,

    #[error("no clear spawn position near target {target} after {attempts} attempts")]
    NoClearPosition { target: EntityId, attempts: u32 },

    #[error("the world refused to spawn an NPC body")]
    EntityRefused,
}

/// Rejected administrative input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdminError {
    #[error("invalid NPC id '{0}', expected a UUID from the active list")]
    MalformedId(String),

    #[error("no active NPC with id {0}")]
    UnknownId(String),
}
