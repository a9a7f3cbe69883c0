//! Error types for the StudyHub core

use studyhub_types::{ContentKind, FileKind, Id, ItemRef};
use thiserror::Error;

/// Main error type for StudyHub.
///
/// The reducer never hands these to its caller: they are rendered into
/// the `errorMessage` of the returned state.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("No data loaded")]
    NotLoaded,

    #[error("Item not found: {0}")]
    UnknownId(Id),

    #[error("Item {id} is not a {expected}")]
    WrongKind { id: Id, expected: &'static str },

    #[error("No current folder selected")]
    NoCurrentFolder,

    #[error("No current file selected")]
    NoCurrentFile,

    #[error("Cannot resolve {0}: nothing selected")]
    UnresolvedReference(ItemRef),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Content type mismatch: expected {expected}, got {found}")]
    ContentTypeMismatch { expected: String, found: String },

    #[error("A {file} file cannot hold {content} content")]
    IncompatibleContent { file: FileKind, content: ContentKind },

    #[error("Invalid {kind} content: {message}")]
    InvalidContent { kind: ContentKind, message: String },

    #[error("{0} content is not supported yet")]
    Unsupported(ContentKind),

    #[error("Item {0} has neither a name nor a title")]
    NotRenamable(Id),

    #[error("Type mismatch for item {id}: expected {expected}, got {found}")]
    TypeMismatch {
        id: Id,
        expected: String,
        found: String,
    },

    #[error("Id collision: {0} is already in use")]
    IdCollision(Id),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Answer '{answer}' is not an option of question {id}")]
    InvalidAnswer { id: Id, answer: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration file not found in {0}")]
    ConfigNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;
