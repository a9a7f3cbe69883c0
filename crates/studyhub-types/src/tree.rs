//! Content tree records: folders, files and content items

use crate::id::{Id, IdSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseKindError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Application pages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Page {
    #[default]
    Home,
    Chat,
    Quiz,
    DataCreation,
    Essay,
    Library,
    Study,
}

impl Page {
    pub fn all() -> &'static [Page] {
        &[
            Page::Home,
            Page::Chat,
            Page::Quiz,
            Page::DataCreation,
            Page::Essay,
            Page::Library,
            Page::Study,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "HOME",
            Page::Chat => "CHAT",
            Page::Quiz => "QUIZ",
            Page::DataCreation => "DATA_CREATION",
            Page::Essay => "ESSAY",
            Page::Library => "LIBRARY",
            Page::Study => "STUDY",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Page {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Page::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| ParseKindError::new("page", s))
    }
}

/// Kinds of file a folder can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Conversation,
    Quiz,
    Flashcard,
}

impl FileKind {
    pub fn all() -> &'static [FileKind] {
        &[FileKind::Conversation, FileKind::Quiz, FileKind::Flashcard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Conversation => "conversation",
            FileKind::Quiz => "quiz",
            FileKind::Flashcard => "flashcard",
        }
    }

    /// Page shown while a file of this kind is selected
    pub fn page(&self) -> Page {
        match self {
            FileKind::Conversation => Page::Chat,
            FileKind::Quiz | FileKind::Flashcard => Page::Quiz,
        }
    }

    /// Whether a file of this kind may hold content of the given kind.
    ///
    /// Flashcard decks store question items: `question` is the front,
    /// `correctAnswer` the back.
    pub fn accepts(&self, content: ContentKind) -> bool {
        match self {
            FileKind::Conversation => {
                matches!(content, ContentKind::Text | ContentKind::Question)
            }
            FileKind::Quiz | FileKind::Flashcard => content == ContentKind::Question,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseKindError::new("file type", s))
    }
}

/// Kinds of content item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Question,
    Image,
    Video,
    Audio,
}

impl ContentKind {
    pub fn all() -> &'static [ContentKind] {
        &[
            ContentKind::Text,
            ContentKind::Question,
            ContentKind::Image,
            ContentKind::Video,
            ContentKind::Audio,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Question => "question",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseKindError::new("content type", s))
    }
}

/// Serialized as the constant `"folder"` type tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderTag {
    #[default]
    Folder,
}

/// Top-level grouping node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type", default)]
    pub tag: FolderTag,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: Vec<DataFile>,
}

/// A conversation, quiz or flashcard deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Library document the file was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<String>,
}

/// Payload of a question item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItems {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl QuestionItems {
    pub fn is_answered(&self) -> bool {
        self.selected_answer.is_some()
    }
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContentItem {
    pub id: Id,
    pub items: String,
    #[serde(default)]
    pub is_ai_response: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One quiz question with its live answer state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionContentItem {
    pub id: Id,
    pub items: QuestionItems,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Content item, tagged by its `type` field.
///
/// Image, video and audio kinds exist in [`ContentKind`] but have no
/// payload representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text(TextContentItem),
    Question(QuestionContentItem),
}

impl ContentItem {
    pub fn id(&self) -> Id {
        match self {
            ContentItem::Text(t) => t.id,
            ContentItem::Question(q) => q.id,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Text(_) => ContentKind::Text,
            ContentItem::Question(_) => ContentKind::Question,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ContentItem::Text(t) => t.created_at,
            ContentItem::Question(q) => q.created_at,
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ContentItem::Text(t) => t.updated_at,
            ContentItem::Question(q) => q.updated_at,
        }
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        match self {
            ContentItem::Text(t) => t.updated_at = Some(at),
            ContentItem::Question(q) => q.updated_at = Some(at),
        }
    }

    pub fn as_question(&self) -> Option<&QuestionContentItem> {
        match self {
            ContentItem::Question(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_question_mut(&mut self) -> Option<&mut QuestionContentItem> {
        match self {
            ContentItem::Question(q) => Some(q),
            _ => None,
        }
    }
}

/// The aggregate root persisted under a single storage key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderStructureRoot {
    #[serde(default)]
    pub ids: IdSet,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_folder_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file_id: Option<Id>,
    #[serde(default)]
    pub current_page: Page,
}

impl FolderStructureRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the folder/file selection and return to the home page
    pub fn clear_selection(&mut self) {
        self.current_folder_id = None;
        self.current_file_id = None;
        self.current_page = Page::Home;
    }
}
