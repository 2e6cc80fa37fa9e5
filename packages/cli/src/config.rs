use mindmap_editor::{AutosaveConfig, HistoryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "mindmap.config.json";

/// Mindmap configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MindMapConfig {
    /// Quiet period before an autosave, in seconds
    pub autosave_interval_secs: u64,

    /// Age above which a stored autosave is a conflict, in milliseconds
    pub conflict_threshold_ms: u64,

    /// Number of undo levels
    pub history_limit: usize,

    /// Number of recovery slots kept
    pub save_slot_limit: usize,

    /// Directory holding autosave records, relative to the config file
    pub storage_dir: String,
}

impl MindMapConfig {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: MindMapConfig = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", config_path.display(), e))?;
            tracing::debug!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(MindMapConfig::default())
        }
    }

    /// Get absolute path to the storage directory
    pub fn get_storage_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.storage_dir)
    }

    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            limit: self.history_limit,
        }
    }

    pub fn autosave_config(&self) -> AutosaveConfig {
        AutosaveConfig {
            interval: Duration::from_secs(self.autosave_interval_secs),
            conflict_threshold: Duration::from_millis(self.conflict_threshold_ms),
            slot_limit: self.save_slot_limit,
        }
    }
}

impl Default for MindMapConfig {
    fn default() -> Self {
        Self {
            autosave_interval_secs: 30,
            conflict_threshold_ms: 60_000,
            history_limit: 50,
            save_slot_limit: 5,
            storage_dir: ".mindmap".to_string(),
        }
    }
}
