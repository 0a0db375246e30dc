//! Host settings with persistence
//!
//! Settings are saved to `~/.config/mystic/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use mystic_game::{ArchetypeConfigs, ArchetypeTable, EngineConfig, MessagesConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything the host reads from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MysticSettings {
    pub engine: EngineConfig,
    pub messages: MessagesConfig,
    /// NPC types keyed by id. Empty means the built-in pair.
    pub archetypes: ArchetypeConfigs,
}

impl MysticSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mystic"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Failed to parse settings: {}, using defaults", e);
                Self::default()
            }),
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Whether a settings file is already on disk
    pub fn file_exists() -> bool {
        Self::settings_path().is_some_and(|p| p.exists())
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn archetype_table(&self) -> ArchetypeTable {
        if self.archetypes.is_empty() {
            ArchetypeTable::builtin()
        } else {
            ArchetypeTable::from_config(&self.archetypes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = MysticSettings::parse(
            r#"
            [engine]
            spawn_chance_percent = 50

            [messages]
            prefix = "[Q] "

            [archetypes.hermit]
            name = "Hermit"
            "#,
        )
        .unwrap();
        assert_eq!(settings.engine.spawn_chance_percent, 50);
        assert_eq!(settings.engine.abandon_radius, 30.0);
        assert_eq!(settings.messages.prefix, "[Q] ");
        assert_eq!(settings.messages.choice_prompt, "/accept or /reject");

        let table = settings.archetype_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("hermit").name, "Hermit");
    }

    #[test]
    fn test_empty_archetypes_use_builtin() {
        let settings = MysticSettings::default();
        assert_eq!(settings.archetype_table().len(), 2);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let settings = MysticSettings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed = MysticSettings::parse(&text).unwrap();
        assert_eq!(parsed.engine.despawn_time_secs, settings.engine.despawn_time_secs);
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = std::env::temp_dir().join(format!("mystic-settings-{}", std::process::id()));
        let path = dir.join("nested").join("settings.toml");

        let mut settings = MysticSettings::default();
        settings.engine.spawn_chance_percent = 7;
        settings.messages.prefix = "[Saved] ".to_string();
        settings.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let loaded = MysticSettings::parse(&text).unwrap();
        assert_eq!(loaded.engine.spawn_chance_percent, 7);
        assert_eq!(loaded.messages.prefix, "[Saved] ");
        assert_eq!(loaded.archetype_table().len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
