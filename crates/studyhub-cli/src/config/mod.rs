//! Home directory, configuration and storage wiring

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use studyhub_core::{ConfigManager, FileStorage, PersistenceAdapter, StudyConfig, TreeStore};

pub struct SettingsManager;

impl SettingsManager {
    /// Get the StudyHub home directory (~/.studyhub)
    pub fn studyhub_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("STUDYHUB_HOME") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".studyhub"))
    }

    /// Directory the tree is stored in
    pub fn store_dir(home: &Path) -> PathBuf {
        home.join("store")
    }

    /// Path a new config file is written to
    pub fn default_config_path(home: &Path) -> PathBuf {
        home.join(studyhub_core::CONFIG_FILE_NAMES[0])
    }

    /// Load the config in `home`, defaults when none exists
    pub fn load_config(home: &Path) -> Result<StudyConfig> {
        ConfigManager::new()
            .load_or_default(home)
            .with_context(|| format!("Failed to load configuration from {:?}", home))
    }

    pub fn persistence(home: &Path) -> Result<PersistenceAdapter> {
        let config = Self::load_config(home)?;
        let storage = FileStorage::new(Self::store_dir(home));
        Ok(PersistenceAdapter::from_config(Box::new(storage), &config))
    }

    /// Open the persisted tree under `home`
    pub fn open_store(home: &Path) -> Result<TreeStore> {
        Ok(TreeStore::open(Self::persistence(home)?))
    }
}
