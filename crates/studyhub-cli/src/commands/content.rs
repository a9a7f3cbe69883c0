//! Content commands for the current file

use super::commit;
use crate::config::SettingsManager;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use studyhub_core::factory::create_question_item;
use studyhub_core::import::{import_generated_questions, question_candidate, questions_to_actions};
use studyhub_types::{Action, AddContentPayload};

pub async fn text(home: &Path, text: &str, ai: bool) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::AddContent(AddContentPayload {
            kind: "text".to_string(),
            content_item: json!({ "type": "text", "items": text, "isAiResponse": ai }),
        })],
    )?;

    println!("{} Message added", "✓".green());
    Ok(())
}

pub async fn question(home: &Path, question: &str, answers: Vec<String>, correct: &str) -> Result<()> {
    let items = create_question_item(question, answers, correct);

    let mut store = SettingsManager::open_store(home)?;
    commit(
        &mut store,
        [Action::AddContent(AddContentPayload {
            kind: "question".to_string(),
            content_item: question_candidate(&items),
        })],
    )?;

    println!("{} Question added", "✓".green());
    Ok(())
}

pub async fn import(home: &Path, path: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    let report = import_generated_questions(&raw)?;

    for rejected in &report.rejected {
        println!(
            "{} Skipped question {}: {}",
            "⚠".yellow(),
            rejected.index,
            rejected.reason.dimmed()
        );
    }
    if report.accepted.is_empty() {
        anyhow::bail!("No usable questions in {:?}", path);
    }

    let mut store = SettingsManager::open_store(home)?;
    commit(&mut store, questions_to_actions(&report.accepted))?;

    println!(
        "{} Imported {} questions",
        "✓".green(),
        report.accepted.len().to_string().cyan()
    );
    Ok(())
}
