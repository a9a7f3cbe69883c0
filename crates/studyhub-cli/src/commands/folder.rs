//! Folder commands

use super::commit;
use crate::config::SettingsManager;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use studyhub_types::{Action, AddFolderPayload, Id};

pub async fn add(home: &Path, name: &str, active: bool) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::AddFolder(AddFolderPayload {
            name: name.to_string(),
            created_at: None,
            set_active: active,
        })],
    )?;

    let id = store
        .root()
        .and_then(|root| root.folders.last())
        .map(|f| f.id)
        .unwrap_or_default();
    println!("{} Folder '{}' created ({})", "✓".green(), name.cyan(), id);
    Ok(())
}

pub async fn toggle(home: &Path, id: Id) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(&mut store, [Action::ToggleCurrentFolder(id)])?;

    match store.root().and_then(|root| root.current_folder_id) {
        Some(current) => println!("{} Current folder: {}", "✓".green(), current),
        None => println!("{} Folder deselected", "✓".green()),
    }
    Ok(())
}
