//! Sample data for a first launch

use crate::config::SeedOptions;
use crate::factory::{
    create_conversation, create_folder, create_question_content_item, create_question_item,
    create_quiz, create_text_content_item,
};
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use studyhub_types::{ContentItem, FolderStructureRoot, IdSet, Page};

const SUBJECTS: &[&str] = &[
    "Biology", "History", "Algebra", "Chemistry", "Literature", "Physics", "Geography",
];

const CHAT_TURNS: &[(&str, &str)] = &[
    (
        "Can you explain photosynthesis simply?",
        "Plants turn light, water and carbon dioxide into sugar and oxygen.",
    ),
    (
        "What caused the fall of Rome?",
        "Historians point to economic strain, overextension and political instability.",
    ),
    (
        "How do I factor x^2 - 9?",
        "It is a difference of squares: (x - 3)(x + 3).",
    ),
];

const QUESTIONS: &[(&str, [&str; 4], &str)] = &[
    ("2 + 2 = ?", ["3", "4", "5", "6"], "4"),
    ("Chemical symbol for gold?", ["Ag", "Au", "Gd", "Go"], "Au"),
    ("Largest planet?", ["Mars", "Venus", "Jupiter", "Saturn"], "Jupiter"),
    (
        "Powerhouse of the cell?",
        ["Nucleus", "Ribosome", "Mitochondria", "Golgi"],
        "Mitochondria",
    ),
];

fn sample_chat(ids: &mut IdSet, rng: &mut impl Rng) -> Vec<ContentItem> {
    let (question, answer) = *CHAT_TURNS.choose(rng).unwrap_or(&CHAT_TURNS[0]);
    vec![
        create_text_content_item(ids, question, false),
        create_text_content_item(ids, answer, true),
    ]
}

fn sample_questions(ids: &mut IdSet, rng: &mut impl Rng) -> Vec<ContentItem> {
    let count = rng.gen_range(1..=QUESTIONS.len());
    QUESTIONS
        .choose_multiple(rng, count)
        .map(|(question, answers, correct)| {
            let items = create_question_item(
                *question,
                answers.iter().map(|a| a.to_string()).collect(),
                *correct,
            );
            create_question_content_item(ids, items)
        })
        .collect()
}

/// A small random tree: up to `max_folders` folders holding up to
/// `max_files` conversations and quizzes with sample content
pub fn generate_fake_folder_structure_root(options: &SeedOptions) -> FolderStructureRoot {
    let mut rng = rand::thread_rng();
    let mut ids = IdSet::new();

    let folder_count = rng.gen_range(1..=options.max_folders.max(1));
    let file_count = rng.gen_range(1..=options.max_files.max(1));

    let mut folders = Vec::with_capacity(folder_count);
    for i in 0..folder_count {
        let name = SUBJECTS[i % SUBJECTS.len()];
        let created_at = Utc::now() - Duration::days(rng.gen_range(0..30));
        folders.push(create_folder(&mut ids, name, created_at, Vec::new()));
    }

    for n in 0..file_count {
        let folder = &mut folders[n % folder_count];
        let file = if rng.gen_bool(0.5) {
            let content = sample_chat(&mut ids, &mut rng);
            create_conversation(&mut ids, format!("{} chat {}", folder.name, n + 1), content)
        } else {
            let content = sample_questions(&mut ids, &mut rng);
            create_quiz(&mut ids, format!("{} quiz {}", folder.name, n + 1), content)
        };
        folder.files.push(file);
    }

    FolderStructureRoot {
        ids,
        folders,
        current_folder_id: None,
        current_file_id: None,
        current_page: Page::Home,
    }
}
