//! Whole-tree commands

use super::commit;
use crate::config::SettingsManager;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use studyhub_core::lookup::find_file;
use studyhub_core::progress::{quiz_progress, QuizProgress, TreeStats};
use studyhub_core::TreeStore;
use studyhub_types::{Action, ContentItem, DataFile, FileKind, FolderStructureRoot, Id, Page};

fn file_icon(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Conversation => "💬",
        FileKind::Quiz => "📝",
        FileKind::Flashcard => "🗂",
    }
}

fn print_content(item: &ContentItem) {
    match item {
        ContentItem::Text(text) => {
            let speaker = if text.is_ai_response { "ai " } else { "you" };
            println!(
                "            {} {} {}",
                format!("[{}]", text.id).dimmed(),
                speaker.magenta(),
                text.items
            );
        }
        ContentItem::Question(q) => {
            let mark = match q.items.is_correct {
                Some(true) => "✓".green(),
                Some(false) => "✗".red(),
                None => "·".dimmed(),
            };
            println!(
                "            {} {} {} ({})",
                format!("[{}]", q.id).dimmed(),
                mark,
                q.items.question,
                q.items.answers.join(" | ").dimmed()
            );
        }
    }
}

fn print_file(file: &DataFile, current: bool) {
    let marker = if current { "*" } else { " " };
    let detail = match file.kind {
        FileKind::Conversation => format!("{} turns", file.content.len()),
        _ => {
            let progress = quiz_progress(file);
            format!("{}/{} answered", progress.answered, progress.total)
        }
    };
    println!(
        "      [{}] {} {} {} {}",
        marker,
        file_icon(file.kind),
        file.title.cyan(),
        format!("({})", file.id).dimmed(),
        detail.dimmed()
    );
    if current {
        for item in &file.content {
            print_content(item);
        }
    }
}

fn print_tree(root: &FolderStructureRoot) {
    println!(
        "{} {}",
        "📚 StudyHub".blue().bold(),
        format!("page: {}", root.current_page).dimmed()
    );
    println!();

    if root.folders.is_empty() {
        println!("   (No folders yet)");
        println!();
        println!("   Create one with: {}", "studyhub folder add <name> --active".dimmed());
        return;
    }

    for folder in &root.folders {
        let marker = if root.current_folder_id == Some(folder.id) {
            "*"
        } else {
            " "
        };
        println!(
            "   [{}] 📁 {} {}",
            marker,
            folder.name.bold(),
            format!("({})", folder.id).dimmed()
        );
        for file in &folder.files {
            print_file(file, root.current_file_id == Some(file.id));
        }
    }
}

fn loaded_root(store: &TreeStore) -> Result<&FolderStructureRoot> {
    store.root().context("No tree loaded")
}

pub async fn load(home: &Path) -> Result<()> {
    let mut store = TreeStore::new(SettingsManager::persistence(home)?);
    let state = store.dispatch(Action::Load);
    let root = state.sorted_data.as_ref().context("No tree loaded")?;

    println!(
        "{} Loaded {} folders",
        "✓".green(),
        root.folders.len().to_string().cyan()
    );
    Ok(())
}

pub async fn save(home: &Path) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(&mut store, std::iter::empty())?;
    println!("{} Tree saved", "✓".green());
    Ok(())
}

pub async fn show(home: &Path, json: bool) -> Result<()> {
    let store = SettingsManager::open_store(home)?;
    if json {
        println!("{}", serde_json::to_string_pretty(store.state())?);
    } else {
        print_tree(loaded_root(&store)?);
    }
    Ok(())
}

pub async fn page(home: &Path, page: Page) -> Result<()> {
    let mut store = SettingsManager::open_store(home)?;
    commit(&mut store, [Action::SetPage(page)])?;
    println!("{} Page set to {}", "✓".green(), page.to_string().cyan());
    Ok(())
}

fn print_progress(title: &str, progress: QuizProgress) {
    println!(
        "   {} {}/{} answered, {} correct ({:.0}%)",
        title.cyan(),
        progress.answered,
        progress.total,
        progress.correct,
        progress.score()
    );
}

pub async fn progress(home: &Path, file_id: Option<Id>) -> Result<()> {
    let store = SettingsManager::open_store(home)?;
    let root = loaded_root(&store)?;

    if let Some(id) = file_id.or(root.current_file_id) {
        let file = find_file(&root.folders, id)
            .with_context(|| format!("File {} not found", id))?;
        print_progress(&file.title, quiz_progress(file));
        return Ok(());
    }

    let stats = TreeStats::from_root(root);
    println!("{}", "📊 Tree".blue().bold());
    println!("   Folders:       {}", stats.folders);
    println!(
        "   Files:         {} ({} chats, {} quizzes, {} flashcard decks)",
        stats.files, stats.conversations, stats.quizzes, stats.flashcards
    );
    println!("   Content items: {}", stats.content_items);
    println!();

    let quizzes: Vec<&DataFile> = root
        .folders
        .iter()
        .flat_map(|f| f.files.iter())
        .filter(|f| f.kind != FileKind::Conversation)
        .collect();
    if !quizzes.is_empty() {
        println!("{}", "📝 Quizzes".blue().bold());
        for file in quizzes {
            print_progress(&file.title, quiz_progress(file));
        }
    }
    Ok(())
}

pub async fn dispatch(home: &Path, json: &str) -> Result<()> {
    let action: Action = serde_json::from_str(json).context("Invalid action JSON")?;
    let name = action.name();

    let mut store = SettingsManager::open_store(home)?;
    commit(&mut store, [action])?;

    println!("{} {} applied", "✓".green(), name.cyan());
    Ok(())
}
