//! Commands addressing a single item by id

use super::commit;
use crate::config::SettingsManager;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;
use studyhub_core::lookup::get_item_by_id;
use studyhub_types::{
    Action, DeleteItemInFilePayload, DeleteItemPayload, Id, ItemRef, RenameSlotPayload,
    ResetAnswersPayload, SelectAnswerPayload, UpdateItemPayload,
};

/// `file`, `folder` or an integer (-1 and -2 are the current file and folder)
pub fn parse_item_ref(s: &str) -> std::result::Result<ItemRef, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "file" | "current-file" => Ok(ItemRef::CurrentFile),
        "folder" | "current-folder" => Ok(ItemRef::CurrentFolder),
        other => {
            let value: i64 = other
                .parse()
                .map_err(|_| format!("'{}' is not an id, 'file' or 'folder'", s))?;
            ItemRef::try_from(value).map_err(|e| e.to_string())
        }
    }
}

pub async fn delete(home: &Path, id: Id, yes: bool) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;

    let label = store
        .root()
        .and_then(|root| get_item_by_id(&root.folders, id))
        .map(|node| format!("{} {}", node.type_name(), id))
        .with_context(|| format!("Item {} not found", id))?;

    if !yes {
        let confirm: bool = dialoguer::Confirm::new()
            .with_prompt(format!("Delete {} and everything in it?", label))
            .default(false)
            .interact()?;

        if !confirm {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    commit(&mut store, [Action::DeleteItem(DeleteItemPayload { id })])?;
    println!("{} Deleted {}", "✓".green(), label);
    Ok(())
}

pub async fn delete_in_file(home: &Path, created_at: DateTime<Utc>) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::DeleteItemInFile(DeleteItemInFilePayload { created_at })],
    )?;
    println!("{} Done", "✓".green());
    Ok(())
}

pub async fn rename(home: &Path, target: ItemRef, name: &str) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::RenameSlot(RenameSlotPayload {
            id: target,
            new_name: name.to_string(),
        })],
    )?;
    println!("{} Renamed {} to '{}'", "✓".green(), target, name.cyan());
    Ok(())
}

pub async fn update(home: &Path, id: Id, json: &str) -> Result<()> {
    let content_item: serde_json::Value =
        serde_json::from_str(json).context("Update must be a JSON object")?;

    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::UpdateItem(UpdateItemPayload { id, content_item })],
    )?;
    println!("{} Updated {}", "✓".green(), id);
    Ok(())
}

pub async fn answer(home: &Path, id: Id, answer: &str) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::SelectAnswer(SelectAnswerPayload {
            id,
            answer: answer.to_string(),
        })],
    )?;

    let correct = store
        .root()
        .and_then(|root| get_item_by_id(&root.folders, id))
        .and_then(|node| node.as_content())
        .and_then(|item| item.as_question())
        .and_then(|q| q.items.is_correct);
    match correct {
        Some(true) => println!("{}", "✅ Correct!".green()),
        _ => println!("{}", "❌ Not quite".red()),
    }
    Ok(())
}

pub async fn reset_answers(home: &Path, file_id: Option<Id>) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::ResetAnswers(ResetAnswersPayload { file_id })],
    )?;
    println!("{} Answers cleared", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_ref() {
        assert_eq!(parse_item_ref("file"), Ok(ItemRef::CurrentFile));
        assert_eq!(parse_item_ref("Folder"), Ok(ItemRef::CurrentFolder));
        assert_eq!(parse_item_ref("-1"), Ok(ItemRef::CurrentFile));
        assert_eq!(parse_item_ref("-2"), Ok(ItemRef::CurrentFolder));
        assert_eq!(parse_item_ref("42"), Ok(ItemRef::Id(42)));
        assert!(parse_item_ref("-7").is_err());
        assert!(parse_item_ref("abc").is_err());
    }
}
