//! Read-only queries over the tree

use serde::Serialize;
use studyhub_types::{ContentItem, DataFile, FileKind, FolderStructureRoot};

/// Answer state of a file's question items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
}

impl QuizProgress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.answered == self.total
    }

    /// Correct answers as a percentage of all questions
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 * 100.0 / self.total as f64
        }
    }
}

pub fn quiz_progress(file: &DataFile) -> QuizProgress {
    file.content
        .iter()
        .filter_map(ContentItem::as_question)
        .fold(QuizProgress::default(), |mut progress, question| {
            progress.total += 1;
            if question.items.is_answered() {
                progress.answered += 1;
            }
            if question.items.is_correct == Some(true) {
                progress.correct += 1;
            }
            progress
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub folders: usize,
    pub files: usize,
    pub conversations: usize,
    pub quizzes: usize,
    pub flashcards: usize,
    pub content_items: usize,
}

impl TreeStats {
    pub fn from_root(root: &FolderStructureRoot) -> Self {
        let mut stats = TreeStats {
            folders: root.folders.len(),
            ..Default::default()
        };
        for file in root.folders.iter().flat_map(|f| f.files.iter()) {
            stats.files += 1;
            stats.content_items += file.content.len();
            match file.kind {
                FileKind::Conversation => stats.conversations += 1,
                FileKind::Quiz => stats.quizzes += 1,
                FileKind::Flashcard => stats.flashcards += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{
        create_conversation, create_folder, create_question_content_item, create_question_item,
        create_quiz, create_text_content_item,
    };
    use chrono::Utc;
    use studyhub_types::IdSet;

    #[test]
    fn test_quiz_progress_and_stats() {
        let mut ids = IdSet::new();
        let mut answered = create_question_item("2+2?", vec!["3".into(), "4".into()], "4");
        answered.selected_answer = Some("4".to_string());
        answered.is_correct = Some(true);
        let mut wrong = create_question_item("3+3?", vec!["6".into(), "7".into()], "6");
        wrong.selected_answer = Some("7".to_string());
        wrong.is_correct = Some(false);
        let open = create_question_item("1+1?", vec!["2".into(), "3".into()], "2");

        let questions = vec![answered, wrong, open]
            .into_iter()
            .map(|q| create_question_content_item(&mut ids, q))
            .collect();
        let quiz = create_quiz(&mut ids, "Math", questions);

        let progress = quiz_progress(&quiz);
        assert_eq!(
            progress,
            QuizProgress {
                total: 3,
                answered: 2,
                correct: 1
            }
        );
        assert!(!progress.is_complete());
        assert!((progress.score() - 100.0 / 3.0).abs() < 1e-9);

        let hello = create_text_content_item(&mut ids, "hi", false);
        let chat = create_conversation(&mut ids, "Chat", vec![hello]);
        let mut root = FolderStructureRoot::new();
        root.folders
            .push(create_folder(&mut ids, "School", Utc::now(), vec![quiz, chat]));

        let stats = TreeStats::from_root(&root);
        assert_eq!(stats.folders, 1);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.quizzes, 1);
        assert_eq!(stats.conversations, 1);
        assert_eq!(stats.content_items, 4);
        assert_eq!(quiz_progress(&root.folders[0].files[1]), QuizProgress::default());
    }
}
