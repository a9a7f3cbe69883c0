//! Persistence adapter
//!
//! The whole tree lives as one JSON document under a single key of a
//! key-value store. Writes only happen when the reducer handles
//! `LOAD`/`SAVE`; mutations never persist implicitly.

use crate::config::{SeedOptions, StudyConfig};
use crate::error::Result;
use crate::seed::generate_fake_folder_structure_root;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use studyhub_types::FolderStructureRoot;
use tracing::{debug, warn};

/// Default key the tree is stored under
pub const STORAGE_KEY: &str = "folderStructureRoot";

/// Local key-value store port
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, used by tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStorage {
    data: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        std::fs::write(&path, value)?;

        // Restrict to owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Parse a persisted tree. Anything that is not a JSON object, or does
/// not fit the tree shape, yields `None`.
pub fn convert_to_sorted_json(raw: &str) -> Option<FolderStructureRoot> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Stored tree is not valid JSON: {}", e);
            return None;
        }
    };
    if !value.is_object() {
        warn!("Stored tree is not a JSON object");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(root) => Some(root),
        Err(e) => {
            warn!("Stored tree does not match the expected shape: {}", e);
            None
        }
    }
}

/// Binds a store to the key and seeding policy the tree uses
pub struct PersistenceAdapter {
    store: Box<dyn KeyValueStore>,
    key: String,
    pretty: bool,
    seed: SeedOptions,
}

impl PersistenceAdapter {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::from_config(store, &StudyConfig::default())
    }

    pub fn from_config(store: Box<dyn KeyValueStore>, config: &StudyConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            pretty: config.pretty_json,
            seed: config.seed.clone(),
        }
    }

    /// In-memory adapter that never seeds, for tests
    pub fn in_memory() -> Self {
        let mut adapter = Self::new(Box::new(MemoryStorage::new()));
        adapter.seed.enabled = false;
        adapter
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Serialize and write the tree, returning the written string
    pub fn save(&self, root: &FolderStructureRoot) -> Result<String> {
        let raw = if self.pretty {
            serde_json::to_string_pretty(root)?
        } else {
            serde_json::to_string(root)?
        };
        self.store.set(&self.key, &raw)?;
        debug!("Saved tree under '{}' ({} bytes)", self.key, raw.len());
        Ok(raw)
    }

    pub fn load(&self) -> Result<Option<String>> {
        self.store.get(&self.key)
    }

    /// Tree used when nothing usable is stored
    pub fn fallback_root(&self) -> FolderStructureRoot {
        if self.seed.enabled {
            generate_fake_folder_structure_root(&self.seed)
        } else {
            FolderStructureRoot::new()
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_convert_rejects_non_objects() {
        assert!(convert_to_sorted_json("[1, 2]").is_none());
        assert!(convert_to_sorted_json("not json").is_none());
        assert!(convert_to_sorted_json(r#"{"folders": "nope"}"#).is_none());

        let root = convert_to_sorted_json(r#"{"ids": [3], "folders": []}"#).unwrap();
        assert!(root.ids.contains(3));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("store"));

        assert_eq!(storage.get("tree").unwrap(), None);
        storage.set("tree", "{}").unwrap();
        assert_eq!(storage.get("tree").unwrap().as_deref(), Some("{}"));
        assert!(storage.path_for("tree").exists());

        storage.remove("tree").unwrap();
        assert_eq!(storage.get("tree").unwrap(), None);
    }

    #[test]
    fn test_adapter_save_and_load() {
        let adapter = PersistenceAdapter::in_memory();
        assert_eq!(adapter.load().unwrap(), None);

        let mut root = FolderStructureRoot::new();
        root.ids.insert(5);
        let raw = adapter.save(&root).unwrap();

        assert_eq!(adapter.load().unwrap(), Some(raw.clone()));
        assert_eq!(convert_to_sorted_json(&raw), Some(root));
        assert!(adapter.fallback_root().folders.is_empty());
    }
}
