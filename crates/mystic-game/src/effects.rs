//! Named sound and particle cues played through the world adapter

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A presentation cue. The world adapter decides what each one looks or
/// sounds like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Ambient chatter used for the proximity notification
    VillagerAmbient,
    /// Glow particles around the target on notification
    NotifyParticles,
    /// Trail left behind while approaching
    ApproachTrail,
    /// Occasional shimmer while approaching
    ApproachShimmer,
    /// Rare hum while approaching
    ApproachHum,
    /// The NPC opens its offer
    OfferOpened,
    /// One typed character group
    TypingTick,
    /// The accept/reject prompt appears
    ChoicePing,
    /// The target accepted
    Accepted,
    /// The target declined or the NPC lost interest
    Declined,
    /// Smoke while walking backwards
    RetreatSmoke,
    /// Final vanishing burst
    DespawnBurst,
}

/// Static name lookup, built once. Names are matched case-insensitively.
const EFFECT_NAMES: &[(&str, Effect)] = &[
    ("villager_ambient", Effect::VillagerAmbient),
    ("notify_particles", Effect::NotifyParticles),
    ("approach_trail", Effect::ApproachTrail),
    ("approach_shimmer", Effect::ApproachShimmer),
    ("approach_hum", Effect::ApproachHum),
    ("offer_opened", Effect::OfferOpened),
    ("typing_tick", Effect::TypingTick),
    ("choice_ping", Effect::ChoicePing),
    ("accepted", Effect::Accepted),
    ("declined", Effect::Declined),
    ("retreat_smoke", Effect::RetreatSmoke),
    ("despawn_burst", Effect::DespawnBurst),
];

impl Effect {
    /// Resolve a configured cue name
    pub fn lookup(name: &str) -> Option<Effect> {
        let name = name.trim();
        EFFECT_NAMES
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, effect)| *effect)
    }

    /// Resolve a configured cue name, falling back to `default` with a warning
    pub fn from_name(name: &str, default: Effect) -> Effect {
        match Self::lookup(name) {
            Some(effect) => effect,
            None => {
                warn!("Unknown effect '{}' in config, using {:?}", name, default);
                default
            }
        }
    }

    pub fn name(self) -> &'static str {
        EFFECT_NAMES
            .iter()
            .find(|(_, effect)| *effect == self)
            .map(|(key, _)| *key)
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_effect_has_a_unique_name() {
        for (name, effect) in EFFECT_NAMES {
            assert_eq!(Effect::lookup(name), Some(*effect));
            assert_eq!(effect.name(), *name);
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(Effect::lookup("VILLAGER_AMBIENT"), Some(Effect::VillagerAmbient));
    }

    #[test]
    fn test_unknown_name_falls_back() {
        assert_eq!(Effect::from_name("ENTITY_GHAST_SCREAM", Effect::ChoicePing), Effect::ChoicePing);
    }
}
