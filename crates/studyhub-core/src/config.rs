//! Configuration management for StudyHub

use crate::error::{Result, TreeError};
use crate::persistence::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "studyhub.config.yaml",
    "studyhub.config.yml",
    "studyhub.config.json",
];

/// Sample data generated when no tree has been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOptions {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_folders")]
    pub max_folders: usize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_folders() -> usize {
    4
}

fn default_max_files() -> usize {
    12
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_folders: default_max_folders(),
            max_files: default_max_files(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub pretty_json: bool,
    #[serde(default)]
    pub seed: SeedOptions,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            pretty_json: false,
            seed: SeedOptions::default(),
        }
    }
}

/// Validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_error(mut self, field: &str, message: impl Into<String>) -> Self {
        self.valid = false;
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }

    pub fn with_warning(mut self, field: &str, message: impl Into<String>) -> Self {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }
}

/// Configuration manager for loading and saving configurations
pub struct ConfigManager {
    cache: std::collections::HashMap<PathBuf, CachedConfig>,
}

struct CachedConfig {
    config: StudyConfig,
    modified_time: std::time::SystemTime,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            cache: std::collections::HashMap::new(),
        }
    }

    /// Find configuration file in a directory
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Load configuration from a file
    pub fn load(&mut self, config_path: &Path) -> Result<StudyConfig> {
        let metadata = std::fs::metadata(config_path)?;
        let modified_time = metadata
            .modified()
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

        if let Some(cached) = self.cache.get(config_path) {
            if cached.modified_time == modified_time {
                return Ok(cached.config.clone());
            }
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: StudyConfig = if is_json(config_path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        let result = self.validate(&config);
        if !result.valid {
            let messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            return Err(TreeError::InvalidConfig(messages.join("; ")));
        }

        self.cache.insert(
            config_path.to_path_buf(),
            CachedConfig {
                config: config.clone(),
                modified_time,
            },
        );

        Ok(config)
    }

    /// Load configuration from a directory (searches for config files)
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<(StudyConfig, PathBuf)> {
        let config_path = Self::find_config_file(dir)
            .ok_or_else(|| TreeError::ConfigNotFound(dir.display().to_string()))?;

        let config = self.load(&config_path)?;
        Ok((config, config_path))
    }

    /// Load from a directory, falling back to defaults when no file exists
    pub fn load_or_default(&mut self, dir: &Path) -> Result<StudyConfig> {
        match self.load_from_directory(dir) {
            Ok((config, _)) => Ok(config),
            Err(TreeError::ConfigNotFound(_)) => Ok(StudyConfig::default()),
            Err(e) => Err(e),
        }
    }

    pub fn validate(&self, config: &StudyConfig) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let key_regex = regex::Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$")
            .expect("storage key pattern is valid");
        if !key_regex.is_match(&config.storage_key) {
            result = result.with_error(
                "storage_key",
                "Storage key must start with a letter and contain only letters, digits, '_', '.' or '-'",
            );
        }

        if config.seed.max_folders == 0 {
            result = result.with_error("seed.max_folders", "Must be at least 1");
        }
        if config.seed.max_files == 0 {
            result = result.with_error("seed.max_files", "Must be at least 1");
        }
        if config.seed.max_files < config.seed.max_folders {
            result = result.with_warning(
                "seed.max_files",
                "Fewer files than folders: some sample folders will be empty",
            );
        }

        result
    }

    /// Save configuration to a file
    pub fn save(&self, config: &StudyConfig, config_path: &Path) -> Result<()> {
        let content = if is_json(config_path) {
            serde_json::to_string_pretty(config)?
        } else {
            serde_yaml::to_string(config)?
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_with_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("studyhub.config.yaml");
        std::fs::write(&config_path, "storage_key: biology\nseed:\n  max_folders: 2\n")?;

        let mut manager = ConfigManager::new();
        let (config, found) = manager.load_from_directory(temp_dir.path())?;

        assert_eq!(found, config_path);
        assert_eq!(config.storage_key, "biology");
        assert_eq!(config.seed.max_folders, 2);
        assert_eq!(config.seed.max_files, 12);
        assert!(config.seed.enabled);
        assert!(!config.pretty_json);
        Ok(())
    }

    #[test]
    fn test_invalid_storage_key_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("studyhub.config.json");
        std::fs::write(&config_path, r#"{"storage_key": "../escape"}"#)?;

        let mut manager = ConfigManager::new();
        match manager.load(&config_path) {
            Err(TreeError::InvalidConfig(msg)) => assert!(msg.contains("storage_key")),
            other => panic!("expected invalid config, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_missing_file_falls_back_to_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut manager = ConfigManager::new();
        assert_eq!(manager.load_or_default(temp_dir.path())?, StudyConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested/studyhub.config.yaml");
        let config = StudyConfig {
            pretty_json: true,
            ..StudyConfig::default()
        };

        let mut manager = ConfigManager::new();
        manager.save(&config, &config_path)?;
        assert_eq!(manager.load(&config_path)?, config);
        Ok(())
    }
}
