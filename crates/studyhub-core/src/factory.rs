//! Entity factories
//!
//! Every constructor draws its id from the shared [`IdSet`] and registers
//! it there, so records built in a row never collide.

use crate::ids::new_id;
use chrono::{DateTime, Utc};
use serde_json::Value;
use studyhub_types::{
    ContentItem, DataFile, FileKind, Folder, FolderTag, IdSet, QuestionContentItem,
    QuestionItems, TextContentItem,
};

pub fn create_folder(
    ids: &mut IdSet,
    name: impl Into<String>,
    created_at: DateTime<Utc>,
    files: Vec<DataFile>,
) -> Folder {
    Folder {
        id: new_id(ids),
        name: name.into(),
        tag: FolderTag::Folder,
        created_at,
        updated_at: None,
        files,
    }
}

pub fn create_file(
    ids: &mut IdSet,
    kind: FileKind,
    title: impl Into<String>,
    content: Vec<ContentItem>,
) -> DataFile {
    let now = Utc::now();
    DataFile {
        id: new_id(ids),
        kind,
        title: title.into(),
        created_at: now,
        updated_at: now,
        content,
        source_document_id: None,
    }
}

pub fn create_conversation(
    ids: &mut IdSet,
    title: impl Into<String>,
    content: Vec<ContentItem>,
) -> DataFile {
    create_file(ids, FileKind::Conversation, title, content)
}

pub fn create_quiz(ids: &mut IdSet, title: impl Into<String>, content: Vec<ContentItem>) -> DataFile {
    create_file(ids, FileKind::Quiz, title, content)
}

pub fn create_flashcard_deck(
    ids: &mut IdSet,
    title: impl Into<String>,
    content: Vec<ContentItem>,
) -> DataFile {
    create_file(ids, FileKind::Flashcard, title, content)
}

pub fn create_text_content_item(
    ids: &mut IdSet,
    text: impl Into<String>,
    is_ai_response: bool,
) -> ContentItem {
    ContentItem::Text(TextContentItem {
        id: new_id(ids),
        items: text.into(),
        is_ai_response,
        created_at: Utc::now(),
        updated_at: None,
    })
}

pub fn create_question_content_item(ids: &mut IdSet, items: QuestionItems) -> ContentItem {
    ContentItem::Question(QuestionContentItem {
        id: new_id(ids),
        items,
        created_at: Utc::now(),
        updated_at: None,
    })
}

/// Question payload with no answer selected yet
pub fn create_question_item(
    question: impl Into<String>,
    answers: Vec<String>,
    correct_answer: impl Into<String>,
) -> QuestionItems {
    QuestionItems {
        question: question.into(),
        answers,
        correct_answer: correct_answer.into(),
        selected_answer: None,
        is_correct: None,
    }
}

/// Check the `items` object of a question candidate
pub fn check_question_items(items: &Value) -> bool {
    let question_ok = items.get("question").map_or(false, Value::is_string);
    let answers_ok = items
        .get("answers")
        .and_then(Value::as_array)
        .map_or(false, |answers| answers.iter().all(Value::is_string));
    let correct_ok = items.get("correctAnswer").map_or(false, Value::is_string);
    question_ok && answers_ok && correct_ok
}

/// Structural check of a question content item candidate: string
/// `question`, string-array `answers` and string `correctAnswer` under
/// `items`.
pub fn check_item_questions(candidate: &Value) -> bool {
    candidate
        .get("items")
        .map_or(false, check_question_items)
}
