//! StudyHub CLI
//!
//! Drives the study content tree from the terminal: every command opens
//! the stored tree, dispatches actions and saves on success.

mod commands;
mod config;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::SettingsManager;
use std::path::PathBuf;
use studyhub_types::{Id, ItemRef, Page};
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "studyhub")]
#[command(author, version, about = "StudyHub - folders, chats and quizzes for studying", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// StudyHub home directory (defaults to ~/.studyhub)
    #[arg(long, global = true, env = "STUDYHUB_HOME")]
    home: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reload the stored tree, resetting selection (seeds sample data when empty)
    Load,

    /// Persist the current tree
    Save,

    /// Print the tree
    Show {
        /// Print the raw state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch page (HOME clears the selection)
    Page {
        /// HOME, CHAT, QUIZ, DATA_CREATION, ESSAY, LIBRARY or STUDY
        page: Page,
    },

    /// Manage folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },

    /// Manage files
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// Add content to the current file
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Delete a folder, file or content item
    Delete {
        id: Id,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete the content item of the current file created at a timestamp
    #[command(name = "delete-in-file")]
    DeleteInFile {
        /// RFC 3339 timestamp, e.g. 2024-03-01T10:00:00Z
        created_at: DateTime<Utc>,
    },

    /// Rename a folder or file
    Rename {
        /// Item id, `file` for the current file or `folder` for the current folder
        #[arg(value_parser = commands::item::parse_item_ref, allow_hyphen_values = true)]
        target: ItemRef,
        name: String,
    },

    /// Merge a JSON object into an item
    Update { id: Id, json: String },

    /// Answer a quiz question
    Answer { id: Id, answer: String },

    /// Clear the answers of a file
    #[command(name = "reset-answers")]
    ResetAnswers {
        /// File id (defaults to the current file)
        #[arg(long)]
        file: Option<Id>,
    },

    /// Show quiz progress and tree statistics
    Progress {
        /// File id (defaults to the current file)
        #[arg(long)]
        file: Option<Id>,
    },

    /// Dispatch a raw action, e.g. '{"type": "SET_PAGE", "payload": "LIBRARY"}'
    Dispatch { json: String },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FolderAction {
    /// Add a folder
    Add {
        #[arg(default_value = "New Folder")]
        name: String,

        /// Make it the current folder
        #[arg(short, long)]
        active: bool,
    },
    /// Select or deselect a folder
    Toggle { id: Id },
}

#[derive(Subcommand)]
enum FileAction {
    /// Add a file to the current folder
    Add {
        /// conversation, quiz or flashcard
        kind: String,
        title: String,

        /// Make it the current file
        #[arg(short, long)]
        active: bool,
    },
    /// Select or deselect a file (no id clears the selection)
    Toggle { id: Option<Id> },
}

#[derive(Subcommand)]
enum ContentAction {
    /// Add a chat turn
    Text {
        text: String,

        /// Mark as an AI response
        #[arg(long)]
        ai: bool,
    },
    /// Add a quiz question
    Question {
        question: String,

        /// Answer options
        #[arg(short, long = "answer", required = true)]
        answers: Vec<String>,

        /// The correct option
        #[arg(short, long)]
        correct: String,
    },
    /// Import a generated quiz (JSON array of {question, options, answer})
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "studyhub_cli=debug,studyhub_core=debug"
        } else {
            "studyhub_cli=info,studyhub_core=error"
        })
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let result = run(cli).await;

    if let Err(ref e) = result {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}

async fn run(cli: Cli) -> Result<()> {
    let home = match cli.home {
        Some(home) => home,
        None => SettingsManager::studyhub_home()?,
    };
    debug!("Using StudyHub home {:?}", home);

    match cli.command {
        Commands::Load => commands::tree::load(&home).await,
        Commands::Save => commands::tree::save(&home).await,
        Commands::Show { json } => commands::tree::show(&home, json).await,
        Commands::Page { page } => commands::tree::page(&home, page).await,
        Commands::Folder { action } => match action {
            FolderAction::Add { name, active } => commands::folder::add(&home, &name, active).await,
            FolderAction::Toggle { id } => commands::folder::toggle(&home, id).await,
        },
        Commands::File { action } => match action {
            FileAction::Add {
                kind,
                title,
                active,
            } => commands::file::add(&home, &kind, &title, active).await,
            FileAction::Toggle { id } => commands::file::toggle(&home, id).await,
        },
        Commands::Content { action } => match action {
            ContentAction::Text { text, ai } => commands::content::text(&home, &text, ai).await,
            ContentAction::Question {
                question,
                answers,
                correct,
            } => commands::content::question(&home, &question, answers, &correct).await,
            ContentAction::Import { path } => commands::content::import(&home, &path).await,
        },
        Commands::Delete { id, yes } => commands::item::delete(&home, id, yes).await,
        Commands::DeleteInFile { created_at } => {
            commands::item::delete_in_file(&home, created_at).await
        }
        Commands::Rename { target, name } => commands::item::rename(&home, target, &name).await,
        Commands::Update { id, json } => commands::item::update(&home, id, &json).await,
        Commands::Answer { id, answer } => commands::item::answer(&home, id, &answer).await,
        Commands::ResetAnswers { file } => commands::item::reset_answers(&home, file).await,
        Commands::Progress { file } => commands::tree::progress(&home, file).await,
        Commands::Dispatch { json } => commands::tree::dispatch(&home, &json).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&home).await,
            ConfigAction::Init { force } => commands::config::init(&home, force).await,
        },
    }
}
