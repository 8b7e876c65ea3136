//! Configuration for the agent core.
//!
//! Loaded from YAML with a fallback chain:
//! explicit path > `AGENT_CORE_CONFIG` > `./agent-core.yml` > defaults.
//! `AGENT_CORE_STORE` and `AGENT_CORE_DATA_DIR` override the storage section.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::skills::SkillTriggerPolicy;
use crate::utilities::errors::{CoreError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "AGENT_CORE_CONFIG";
/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "agent-core.yml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Simulated delays for mode switches and health transitions.
    pub timing: TimingConfig,
    /// XP amounts and leveling policy.
    pub progression: ProgressionConfig,
    /// Action extractor limits.
    pub actions: ActionConfig,
    /// Persistence backend selection.
    pub storage: StorageConfig,
}

impl CoreConfig {
    /// Load configuration following the fallback chain, then apply env overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_discovered(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_discovered() -> Self {
        let candidates = std::env::var(CONFIG_ENV)
            .ok()
            .map(PathBuf::from)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(DEFAULT_CONFIG_FILE)));

        for candidate in candidates {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return config,
                Err(e) => log::warn!("Failed to load config from {}: {}", candidate.display(), e),
            }
        }

        log::info!("No config file found, using defaults");
        Self::default()
    }

    /// Parse a YAML config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_yaml::from_str(&content)?;
        log::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("AGENT_CORE_STORE") {
            match backend.parse::<StorageBackend>() {
                Ok(b) => self.storage.backend = b,
                Err(e) => log::warn!("Ignoring AGENT_CORE_STORE: {}", e),
            }
        }
        if let Ok(dir) = std::env::var("AGENT_CORE_DATA_DIR") {
            self.storage.path = PathBuf::from(dir);
        }
    }
}

/// Simulated processing delays, in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between "switch initiated" and "switch optimized".
    pub mode_switch_delay_ms: u64,
    /// Dwell time in UNSTABLE before CRITICAL.
    pub unstable_ms: u64,
    /// Dwell time in CRITICAL before REBOOTING.
    pub critical_ms: u64,
    /// Dwell time in REBOOTING before STABLE.
    pub rebooting_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mode_switch_delay_ms: 800,
            unstable_ms: 1_500,
            critical_ms: 4_000,
            rebooting_ms: 8_000,
        }
    }
}

impl TimingConfig {
    pub fn mode_switch_delay(&self) -> Duration {
        Duration::from_millis(self.mode_switch_delay_ms)
    }

    pub fn unstable(&self) -> Duration {
        Duration::from_millis(self.unstable_ms)
    }

    pub fn critical(&self) -> Duration {
        Duration::from_millis(self.critical_ms)
    }

    pub fn rebooting(&self) -> Duration {
        Duration::from_millis(self.rebooting_ms)
    }
}

/// XP economy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// XP granted by `train_skill`.
    pub train_xp: u64,
    /// Agent XP granted on journey completion.
    pub journey_bonus_xp: u64,
    /// Agent XP per reached skill level (`level × this`).
    pub skill_level_bonus_xp: u64,
    /// How keyword buckets route auto-awards to skills.
    pub skill_trigger_policy: SkillTriggerPolicy,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            train_xp: 50,
            journey_bonus_xp: 200,
            skill_level_bonus_xp: 100,
            skill_trigger_policy: SkillTriggerPolicy::default(),
        }
    }
}

/// Action extractor limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Text at or above this many characters is treated as narrative.
    pub max_chars: usize,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self { max_chars: 100 }
    }
}

/// Which persistence adapter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file store, or database file for SQLite.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: PathBuf::from("./data"),
        }
    }
}
