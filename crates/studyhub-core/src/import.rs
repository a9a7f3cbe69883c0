//! Import of AI-generated quiz questions
//!
//! Model output is a JSON array of `{ id, question, options, answer }`.
//! Each element is checked on its own: bad elements are reported by index
//! and the rest still import.

use crate::error::{Result, TreeError};
use crate::factory::create_question_item;
use crate::ports::CompletionService;
use serde_json::{json, Value};
use studyhub_types::{
    Action, AddContentPayload, AddFilePayload, ContentKind, FileKind, GeneratedQuestion,
    GenerationRequest, QuestionItems,
};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedQuestion {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub accepted: Vec<QuestionItems>,
    pub rejected: Vec<RejectedQuestion>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Models like to wrap JSON in a markdown fence
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn map_question(value: &Value) -> std::result::Result<QuestionItems, String> {
    let generated: GeneratedQuestion =
        serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;

    if generated.question.trim().is_empty() {
        return Err("question is empty".to_string());
    }
    if generated.options.len() < 2 {
        return Err(format!("expected at least 2 options, got {}", generated.options.len()));
    }
    if !generated.options.contains(&generated.answer) {
        return Err(format!("answer '{}' is not one of the options", generated.answer));
    }

    Ok(create_question_item(
        generated.question,
        generated.options,
        generated.answer,
    ))
}

pub fn import_generated_questions(raw: &str) -> Result<ImportReport> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let elements = value.as_array().ok_or_else(|| TreeError::InvalidContent {
        kind: ContentKind::Question,
        message: "generated quiz must be a JSON array".to_string(),
    })?;

    let mut report = ImportReport::default();
    for (index, element) in elements.iter().enumerate() {
        match map_question(element) {
            Ok(items) => report.accepted.push(items),
            Err(reason) => {
                warn!("Skipping generated question {}: {}", index, reason);
                report.rejected.push(RejectedQuestion { index, reason });
            }
        }
    }

    info!(
        "Imported {} generated questions ({} rejected)",
        report.accepted.len(),
        report.rejected.len()
    );
    Ok(report)
}

/// Content candidate in the shape `ADD_CONTENT` and `ADD_FILE` expect
pub fn question_candidate(items: &QuestionItems) -> Value {
    json!({ "type": "question", "items": items })
}

/// One `ADD_CONTENT` per question, targeting the current file
pub fn questions_to_actions(questions: &[QuestionItems]) -> Vec<Action> {
    questions
        .iter()
        .map(|items| {
            Action::AddContent(AddContentPayload {
                kind: ContentKind::Question.as_str().to_string(),
                content_item: question_candidate(items),
            })
        })
        .collect()
}

/// Ask the completion service for a quiz and wrap the usable questions
/// into a single `ADD_FILE` for the current folder
pub async fn generate_quiz_file(
    service: &dyn CompletionService,
    request: &GenerationRequest,
    title: &str,
) -> Result<(Action, ImportReport)> {
    let raw = service.generate_quiz(request).await?;
    let report = import_generated_questions(&raw)?;

    let action = Action::AddFile(AddFilePayload {
        kind: FileKind::Quiz.as_str().to_string(),
        title: title.to_string(),
        set_active: true,
        content: report.accepted.iter().map(question_candidate).collect(),
        source_document_id: request.document_id.clone(),
    });
    Ok((action, report))
}
