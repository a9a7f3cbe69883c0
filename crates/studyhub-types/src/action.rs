//! Reducer actions and reducer state

use crate::id::{FileSelection, Id, ItemRef};
use crate::tree::{FolderStructureRoot, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every mutation the content tree accepts.
///
/// Wire form is `{ "type": "ADD_FOLDER", "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Load,
    Save,
    SetPage(Page),
    ToggleCurrentFolder(Id),
    ToggleCurrentFile(FileSelection),
    AddFolder(AddFolderPayload),
    AddFile(AddFilePayload),
    AddContent(AddContentPayload),
    DeleteItem(DeleteItemPayload),
    DeleteItemInFile(DeleteItemInFilePayload),
    RenameSlot(RenameSlotPayload),
    UpdateItem(UpdateItemPayload),
    SelectAnswer(SelectAnswerPayload),
    ResetAnswers(ResetAnswersPayload),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Load => "LOAD",
            Action::Save => "SAVE",
            Action::SetPage(_) => "SET_PAGE",
            Action::ToggleCurrentFolder(_) => "TOGGLE_CURRENT_FOLDER",
            Action::ToggleCurrentFile(_) => "TOGGLE_CURRENT_FILE",
            Action::AddFolder(_) => "ADD_FOLDER",
            Action::AddFile(_) => "ADD_FILE",
            Action::AddContent(_) => "ADD_CONTENT",
            Action::DeleteItem(_) => "DELETE_ITEM",
            Action::DeleteItemInFile(_) => "DELETE_ITEM_IN_FILE",
            Action::RenameSlot(_) => "RENAME_SLOT",
            Action::UpdateItem(_) => "UPDATE_ITEM",
            Action::SelectAnswer(_) => "SELECT_ANSWER",
            Action::ResetAnswers(_) => "RESET_ANSWERS",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn default_folder_name() -> String {
    "New Folder".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFolderPayload {
    #[serde(default = "default_folder_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub set_active: bool,
}

impl Default for AddFolderPayload {
    fn default() -> Self {
        Self {
            name: default_folder_name(),
            created_at: None,
            set_active: false,
        }
    }
}

/// `kind` is checked by the reducer, so it stays a raw string here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFilePayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub set_active: bool,
    /// Pre-built content candidates, validated like `ADD_CONTENT`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<String>,
}

/// The content item arrives as untrusted JSON, typically produced by the
/// AI services, and is shape-checked by the reducer before insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContentPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub content_item: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItemPayload {
    pub id: Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemInFilePayload {
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSlotPayload {
    pub id: ItemRef,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub id: Id,
    pub content_item: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectAnswerPayload {
    pub id: Id,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetAnswersPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Id>,
}

/// What the reducer consumes and produces
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeState {
    /// Last string written to or read from storage
    pub raw_data: Option<String>,
    pub sorted_data: Option<FolderStructureRoot>,
    pub error_message: Option<String>,
}

impl TreeState {
    /// A loaded but empty tree
    pub fn empty() -> Self {
        Self::from_root(FolderStructureRoot::new())
    }

    pub fn from_root(root: FolderStructureRoot) -> Self {
        Self {
            raw_data: None,
            sorted_data: Some(root),
            error_message: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}
