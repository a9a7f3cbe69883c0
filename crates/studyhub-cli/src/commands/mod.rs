pub mod config;
pub mod content;
pub mod file;
pub mod folder;
pub mod item;
pub mod tree;

use anyhow::Result;
use studyhub_core::TreeStore;
use studyhub_types::Action;

/// Dispatch `actions` in order and persist the result.
///
/// Stops at the first rejected action; nothing is saved in that case.
pub fn commit(store: &mut TreeStore, actions: impl IntoIterator<Item = Action>) -> Result<()> {
    for action in actions {
        let name = action.name();
        if let Some(message) = &store.dispatch(action).error_message {
            anyhow::bail!("{} rejected: {}", name, message);
        }
    }
    if let Some(message) = &store.dispatch(Action::Save).error_message {
        anyhow::bail!("Failed to save: {}", message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsManager;
    use studyhub_types::{AddFilePayload, AddFolderPayload};
    use tempfile::TempDir;

    fn empty_home() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("studyhub.config.yaml"),
            "seed:\n  enabled: false\n",
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_commit_saves_on_success() {
        let home = empty_home();
        let mut store = SettingsManager::open_store(home.path()).unwrap();
        commit(
            &mut store,
            [Action::AddFolder(AddFolderPayload {
                name: "Physics".to_string(),
                set_active: true,
                ..Default::default()
            })],
        )
        .unwrap();

        let reopened = SettingsManager::open_store(home.path()).unwrap();
        let root = reopened.root().unwrap();
        assert_eq!(root.folders[0].name, "Physics");
        assert_eq!(root.current_folder_id, Some(root.folders[0].id));
    }

    #[test]
    fn test_commit_stops_without_saving() {
        let home = empty_home();
        let mut store = SettingsManager::open_store(home.path()).unwrap();
        let err = commit(
            &mut store,
            [
                Action::AddFolder(AddFolderPayload::default()),
                Action::AddFile(AddFilePayload {
                    kind: "quiz".to_string(),
                    title: "Orphan".to_string(),
                    set_active: false,
                    content: Vec::new(),
                    source_document_id: None,
                }),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("ADD_FILE rejected"));

        let reopened = SettingsManager::open_store(home.path()).unwrap();
        assert!(reopened.root().unwrap().folders.is_empty());
    }
}
