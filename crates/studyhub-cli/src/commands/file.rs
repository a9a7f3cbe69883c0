//! File commands

use super::commit;
use crate::config::SettingsManager;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use studyhub_types::{Action, AddFilePayload, FileSelection, Id};

pub async fn add(home: &Path, kind: &str, title: &str, active: bool) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::AddFile(AddFilePayload {
            kind: kind.to_string(),
            title: title.to_string(),
            set_active: active,
            content: Vec::new(),
            source_document_id: None,
        })],
    )?;

    println!("{} {} '{}' created", "✓".green(), kind, title.cyan());
    Ok(())
}

pub async fn toggle(home: &Path, id: Option<Id>) -> Result<()> {
    let selection = id.map(FileSelection::Select).unwrap_or(FileSelection::Clear);

    let mut store = SettingsManager::open_store(home)?;
    commit(&mut store, [Action::ToggleCurrentFile(selection)])?;

    if let Some(root) = store.root() {
        match root.current_file_id {
            Some(current) => println!(
                "{} Current file: {} (page {})",
                "✓".green(),
                current,
                root.current_page.to_string().cyan()
            ),
            None => println!("{} File deselected", "✓".green()),
        }
    }
    Ok(())
}
