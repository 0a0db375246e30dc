//! NPC types: display name, story text, and the quest categories they offer

use std::collections::BTreeMap;

use rand::seq::IteratorRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::config::{ArchetypeConfig, ArchetypeConfigs};

pub const DEFAULT_NAME: &str = "Mysterious Figure";
pub const DEFAULT_STORY: &str = "I have a secret quest for you. Are you brave enough to accept?";
/// Key used when an unknown archetype is requested
pub const FALLBACK_KEY: &str = "mysterious_figure";
/// Built-in skin texture used when configured skin data is unusable
pub const DEFAULT_SKIN: &str = "bXlzdGljOmRlZmF1bHQtc2hhZG93LXNraW4=";

/// A resolved NPC type
#[derive(Debug, Clone, PartialEq)]
pub struct Archetype {
    /// Configuration key
    pub key: String,
    pub name: String,
    pub story: String,
    /// Quest categories this NPC may hand out
    pub quest_types: Vec<String>,
    pub skin: String,
}

impl Archetype {
    /// Resolve a configured entry, filling gaps with defaults
    pub fn from_config(key: &str, config: &ArchetypeConfig) -> Self {
        let skin = match config.skin.as_deref() {
            Some(skin) if is_valid_base64(skin) => skin.to_string(),
            _ => {
                info!("Archetype '{}' has missing or invalid skin data, using default skin", key);
                DEFAULT_SKIN.to_string()
            }
        };

        Self {
            key: key.to_string(),
            name: config
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            story: config.story.clone().unwrap_or_else(|| DEFAULT_STORY.to_string()),
            quest_types: config.quest_types.clone(),
            skin,
        }
    }

    /// The archetype used when configuration names one that does not exist
    pub fn fallback() -> Self {
        Self {
            key: FALLBACK_KEY.to_string(),
            name: DEFAULT_NAME.to_string(),
            story: DEFAULT_STORY.to_string(),
            quest_types: Vec::new(),
            skin: DEFAULT_SKIN.to_string(),
        }
    }
}

/// Non-empty and only base64 alphabet with at most two trailing `=`
pub fn is_valid_base64(data: &str) -> bool {
    if data.is_empty() {
        return false;
    }
    let body = data.trim_end_matches('=');
    if data.len() - body.len() > 2 {
        return false;
    }
    body.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// Lookup table of archetypes, built once from configuration
#[derive(Debug, Clone)]
pub struct ArchetypeTable {
    archetypes: BTreeMap<String, Archetype>,
}

impl ArchetypeTable {
    pub fn from_config(configs: &ArchetypeConfigs) -> Self {
        let archetypes = configs
            .iter()
            .map(|(key, config)| (key.clone(), Archetype::from_config(key, config)))
            .collect();
        Self { archetypes }
    }

    /// Table with the two stock NPC types
    pub fn builtin() -> Self {
        Self::from_config(&builtin_configs())
    }

    pub fn get(&self, key: &str) -> Option<&Archetype> {
        self.archetypes.get(key)
    }

    /// Look up `key`, degrading to [`Archetype::fallback`] if unknown
    pub fn resolve(&self, key: &str) -> Archetype {
        match self.archetypes.get(key) {
            Some(archetype) => archetype.clone(),
            None => {
                warn!("NPC type '{}' is not configured, using the default figure", key);
                Archetype::fallback()
            }
        }
    }

    /// Uniform random choice over configured archetypes
    pub fn choose(&self, rng: &mut impl Rng) -> Option<&Archetype> {
        self.archetypes.values().choose(rng)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Configuration entries for the stock NPC types
pub fn builtin_configs() -> ArchetypeConfigs {
    let mut configs = ArchetypeConfigs::new();
    configs.insert(
        "mysterious_stranger".to_string(),
        ArchetypeConfig {
            name: Some("Mysterious Stranger".to_string()),
            story: Some(
                "I come from the shadows with a task that requires your unique skills. \
                 This quest is for your eyes only. Will you accept this challenge?"
                    .to_string(),
            ),
            quest_types: vec!["kill_zombie".to_string(), "collect_diamonds".to_string()],
            skin: Some(DEFAULT_SKIN.to_string()),
        },
    );
    configs.insert(
        "explorer".to_string(),
        ArchetypeConfig {
            name: Some("Explorer".to_string()),
            story: Some(
                "I've heard whispers of a hidden treasure, but I need help to locate it. \
                 Only the bravest adventurers are fit for this journey."
                    .to_string(),
            ),
            quest_types: vec!["explore_desert".to_string()],
            skin: Some(DEFAULT_SKIN.to_string()),
        },
    );
    configs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_base64_validation() {
        assert!(is_valid_base64("bXlzdGlj"));
        assert!(is_valid_base64("YQ=="));
        assert!(!is_valid_base64(""));
        assert!(!is_valid_base64("not base64!"));
        assert!(!is_valid_base64("YQ==="));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let archetype = Archetype::from_config("bare", &ArchetypeConfig::default());
        assert_eq!(archetype.name, DEFAULT_NAME);
        assert_eq!(archetype.story, DEFAULT_STORY);
        assert_eq!(archetype.skin, DEFAULT_SKIN);
    }

    #[test]
    fn test_malformed_skin_degrades_to_default() {
        let config = ArchetypeConfig {
            skin: Some("{{ not a texture }}".to_string()),
            ..Default::default()
        };
        assert_eq!(Archetype::from_config("x", &config).skin, DEFAULT_SKIN);
    }

    #[test]
    fn test_resolve_unknown_uses_fallback() {
        let table = ArchetypeTable::builtin();
        assert_eq!(table.resolve("explorer").name, "Explorer");
        assert_eq!(table.resolve("dragon").key, FALLBACK_KEY);
    }

    #[test]
    fn test_choose_covers_all_types() {
        let table = ArchetypeTable::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(table.choose(&mut rng).unwrap().key.clone());
        }
        assert_eq!(seen.len(), table.len());
    }

    #[test]
    fn test_empty_table_chooses_nothing() {
        let table = ArchetypeTable::from_config(&ArchetypeConfigs::new());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(table.choose(&mut rng).is_none());
    }
}
