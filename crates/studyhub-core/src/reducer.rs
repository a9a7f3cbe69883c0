//! Content tree state machine
//!
//! `reduce` is the only way the tree changes. Each dispatch clones the
//! committed root, mutates the clone, and either commits it or throws it
//! away: a rejected action returns the previous state untouched apart from
//! `errorMessage`.

use crate::error::{Result, TreeError};
use crate::factory::{
    check_item_questions, create_file, create_folder, create_question_content_item,
    create_text_content_item,
};
use crate::lookup::{
    collect_ids, find_content_mut, find_file, find_file_mut, find_folder, find_folder_mut, locate,
    node_at, subtree_ids, Location, NodeRef,
};
use crate::persistence::{convert_to_sorted_json, PersistenceAdapter};
use chrono::Utc;
use serde_json::Value;
use studyhub_types::{
    Action, AddContentPayload, AddFilePayload, AddFolderPayload, ContentItem, ContentKind,
    DataFile, FileKind, FileSelection, Folder, FolderStructureRoot, Id, IdSet, ItemRef, Page,
    QuestionItems, RenameSlotPayload, TreeState, UpdateItemPayload,
};
use tracing::{debug, info, warn};

/// Apply `action` to `state`.
///
/// Never fails outward: errors come back as `errorMessage` on a copy of
/// the input state.
pub fn reduce(state: &TreeState, action: Action, persistence: &PersistenceAdapter) -> TreeState {
    let name = action.name();
    match apply(state, action, persistence) {
        Ok(next) => {
            debug!(action = name, "Action applied");
            next
        }
        Err(e) => {
            warn!(action = name, error = %e, "Action rejected");
            TreeState {
                error_message: Some(e.to_string()),
                ..state.clone()
            }
        }
    }
}

fn apply(state: &TreeState, action: Action, persistence: &PersistenceAdapter) -> Result<TreeState> {
    match action {
        Action::Load => Ok(load(persistence)),
        Action::Save => {
            let root = state.sorted_data.as_ref().ok_or(TreeError::NotLoaded)?;
            let raw = persistence.save(root)?;
            Ok(TreeState {
                raw_data: Some(raw),
                sorted_data: state.sorted_data.clone(),
                error_message: None,
            })
        }
        action => {
            let mut root = state.sorted_data.clone().ok_or(TreeError::NotLoaded)?;
            mutate(&mut root, action)?;
            Ok(TreeState {
                raw_data: state.raw_data.clone(),
                sorted_data: Some(root),
                error_message: None,
            })
        }
    }
}

fn load(persistence: &PersistenceAdapter) -> TreeState {
    let raw = persistence.load().unwrap_or_else(|e| {
        warn!("Failed to read stored tree: {}", e);
        None
    });

    let mut root = match raw.as_deref().and_then(convert_to_sorted_json) {
        Some(root) => root,
        None => {
            info!("No stored tree, starting from sample data");
            persistence.fallback_root()
        }
    };

    root.ids.extend(collect_ids(&root.folders).iter());
    root.clear_selection();

    let raw_data = match persistence.save(&root) {
        Ok(saved) => Some(saved),
        Err(e) => {
            warn!("Failed to persist loaded tree: {}", e);
            raw
        }
    };

    TreeState {
        raw_data,
        sorted_data: Some(root),
        error_message: None,
    }
}

fn mutate(root: &mut FolderStructureRoot, action: Action) -> Result<()> {
    match action {
        Action::Load | Action::Save => Ok(()),
        Action::SetPage(page) => {
            set_page(root, page);
            Ok(())
        }
        Action::ToggleCurrentFolder(id) => toggle_current_folder(root, id),
        Action::ToggleCurrentFile(selection) => toggle_current_file(root, selection),
        Action::AddFolder(payload) => {
            add_folder(root, payload);
            Ok(())
        }
        Action::AddFile(payload) => add_file(root, payload),
        Action::AddContent(payload) => add_content(root, payload),
        Action::DeleteItem(payload) => delete_item(root, payload.id),
        Action::DeleteItemInFile(payload) => {
            let file_id = root.current_file_id.ok_or(TreeError::NoCurrentFile)?;
            let file = find_file_mut(&mut root.folders, file_id).ok_or(TreeError::UnknownId(file_id))?;
            match file
                .content
                .iter()
                .position(|c| c.created_at() == payload.created_at)
            {
                Some(pos) => {
                    let removed = file.content.remove(pos);
                    file.updated_at = Utc::now();
                    root.ids.remove(removed.id());
                }
                None => debug!("No content created at {} in file {}", payload.created_at, file_id),
            }
            Ok(())
        }
        Action::RenameSlot(payload) => rename_slot(root, payload),
        Action::UpdateItem(payload) => update_item(root, payload),
        Action::SelectAnswer(payload) => {
            let item = find_content_mut(&mut root.folders, payload.id)
                .ok_or(TreeError::UnknownId(payload.id))?;
            let question = item.as_question_mut().ok_or(TreeError::WrongKind {
                id: payload.id,
                expected: "question",
            })?;
            if !question.items.answers.contains(&payload.answer) {
                return Err(TreeError::InvalidAnswer {
                    id: payload.id,
                    answer: payload.answer,
                });
            }
            question.items.is_correct = Some(payload.answer == question.items.correct_answer);
            question.items.selected_answer = Some(payload.answer);
            question.updated_at = Some(Utc::now());
            Ok(())
        }
        Action::ResetAnswers(payload) => {
            let file_id = payload
                .file_id
                .or(root.current_file_id)
                .ok_or(TreeError::NoCurrentFile)?;
            let file = find_file_mut(&mut root.folders, file_id).ok_or(TreeError::UnknownId(file_id))?;
            for question in file.content.iter_mut().filter_map(ContentItem::as_question_mut) {
                question.items.selected_answer = None;
                question.items.is_correct = None;
            }
            file.updated_at = Utc::now();
            Ok(())
        }
    }
}

fn set_page(root: &mut FolderStructureRoot, page: Page) {
    if page == Page::Home {
        root.clear_selection();
    } else {
        root.current_page = page;
    }
}

fn toggle_current_folder(root: &mut FolderStructureRoot, id: Id) -> Result<()> {
    if !root.ids.contains(id) {
        return Err(TreeError::UnknownId(id));
    }
    if find_folder(&root.folders, id).is_none() {
        return Err(TreeError::WrongKind {
            id,
            expected: "folder",
        });
    }

    root.current_folder_id = if root.current_folder_id == Some(id) {
        None
    } else {
        Some(id)
    };
    Ok(())
}

fn toggle_current_file(root: &mut FolderStructureRoot, selection: FileSelection) -> Result<()> {
    let id = match selection {
        FileSelection::Clear => {
            if root.current_file_id.take().is_some() {
                root.current_page = Page::Home;
            }
            return Ok(());
        }
        FileSelection::Select(id) => id,
    };

    if !root.ids.contains(id) {
        return Err(TreeError::UnknownId(id));
    }
    let kind = find_file(&root.folders, id)
        .map(|f| f.kind)
        .ok_or(TreeError::WrongKind { id, expected: "file" })?;

    if root.current_file_id == Some(id) {
        root.current_file_id = None;
        root.current_page = Page::Home;
    } else {
        root.current_file_id = Some(id);
        root.current_page = kind.page();
    }
    Ok(())
}

fn add_folder(root: &mut FolderStructureRoot, payload: AddFolderPayload) {
    let created_at = payload.created_at.unwrap_or_else(Utc::now);
    let folder = create_folder(&mut root.ids, payload.name, created_at, Vec::new());
    let id = folder.id;
    root.folders.push(folder);
    if payload.set_active {
        root.current_folder_id = Some(id);
    }
}

fn add_file(root: &mut FolderStructureRoot, payload: AddFilePayload) -> Result<()> {
    let folder_id = root.current_folder_id.ok_or(TreeError::NoCurrentFolder)?;
    let kind: FileKind = payload
        .kind
        .parse()
        .map_err(|_| TreeError::InvalidFileType(payload.kind.clone()))?;

    let content = payload
        .content
        .iter()
        .map(|candidate| build_content_item(&mut root.ids, kind, candidate))
        .collect::<Result<Vec<_>>>()?;

    let mut file = create_file(&mut root.ids, kind, payload.title, content);
    file.source_document_id = payload.source_document_id;
    let id = file.id;

    let folder = find_folder_mut(&mut root.folders, folder_id).ok_or(TreeError::UnknownId(folder_id))?;
    folder.files.push(file);
    folder.updated_at = Some(Utc::now());

    if payload.set_active {
        root.current_file_id = Some(id);
        root.current_page = kind.page();
    }
    Ok(())
}

fn add_content(root: &mut FolderStructureRoot, payload: AddContentPayload) -> Result<()> {
    let file_id = root.current_file_id.ok_or(TreeError::NoCurrentFile)?;
    payload
        .kind
        .parse::<ContentKind>()
        .map_err(|_| TreeError::InvalidContentType(payload.kind.clone()))?;

    let item_type = payload
        .content_item
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("none");
    if item_type != payload.kind {
        return Err(TreeError::ContentTypeMismatch {
            expected: payload.kind,
            found: item_type.to_string(),
        });
    }

    let file_kind = find_file(&root.folders, file_id)
        .map(|f| f.kind)
        .ok_or(TreeError::UnknownId(file_id))?;
    let item = build_content_item(&mut root.ids, file_kind, &payload.content_item)?;

    let file = find_file_mut(&mut root.folders, file_id).ok_or(TreeError::UnknownId(file_id))?;
    file.content.push(item);
    file.updated_at = Utc::now();
    Ok(())
}

/// Validate an untrusted content candidate and stamp it with a fresh id
fn build_content_item(ids: &mut IdSet, file_kind: FileKind, candidate: &Value) -> Result<ContentItem> {
    let type_name = candidate
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TreeError::InvalidContentType("missing".to_string()))?;
    let kind: ContentKind = type_name
        .parse()
        .map_err(|_| TreeError::InvalidContentType(type_name.to_string()))?;

    if matches!(kind, ContentKind::Image | ContentKind::Video | ContentKind::Audio) {
        return Err(TreeError::Unsupported(kind));
    }
    if !file_kind.accepts(kind) {
        return Err(TreeError::IncompatibleContent {
            file: file_kind,
            content: kind,
        });
    }

    match kind {
        ContentKind::Text => {
            let text = candidate
                .get("items")
                .and_then(Value::as_str)
                .ok_or_else(|| TreeError::InvalidContent {
                    kind,
                    message: "items must be a string".to_string(),
                })?;
            let is_ai_response = candidate
                .get("isAiResponse")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(create_text_content_item(ids, text, is_ai_response))
        }
        _ => {
            if !check_item_questions(candidate) {
                return Err(TreeError::InvalidContent {
                    kind,
                    message: "expected items with string question, string answers and string correctAnswer"
                        .to_string(),
                });
            }
            let items: QuestionItems = serde_json::from_value(candidate["items"].clone()).map_err(|e| {
                TreeError::InvalidContent {
                    kind,
                    message: e.to_string(),
                }
            })?;
            Ok(create_question_content_item(ids, items))
        }
    }
}

fn delete_item(root: &mut FolderStructureRoot, id: Id) -> Result<()> {
    let location = locate(&root.folders, id).ok_or(TreeError::UnknownId(id))?;
    let node = node_at(&root.folders, location).ok_or(TreeError::UnknownId(id))?;
    let removed_ids = subtree_ids(node);

    match node {
        NodeRef::Folder(folder) => {
            let holds_current_file = root
                .current_file_id
                .map_or(false, |file_id| folder.files.iter().any(|f| f.id == file_id));
            let is_current_folder = root.current_folder_id == Some(folder.id);
            if holds_current_file {
                root.current_file_id = None;
            }
            if is_current_folder {
                root.current_folder_id = None;
            }
            if holds_current_file || is_current_folder {
                root.current_page = Page::Home;
            }
        }
        NodeRef::File(file) => {
            if root.current_file_id == Some(file.id) {
                root.current_file_id = None;
                root.current_page = Page::Home;
            }
        }
        NodeRef::Content(_) => {}
    }

    let now = Utc::now();
    match location {
        Location::Folder { folder } => {
            root.folders.remove(folder);
        }
        Location::File { folder, file } => {
            let parent = &mut root.folders[folder];
            parent.files.remove(file);
            parent.updated_at = Some(now);
        }
        Location::Content {
            folder,
            file,
            content,
        } => {
            let parent = &mut root.folders[folder].files[file];
            parent.content.remove(content);
            parent.updated_at = now;
        }
    }

    for removed in removed_ids {
        root.ids.remove(removed);
    }
    Ok(())
}

fn rename_slot(root: &mut FolderStructureRoot, payload: RenameSlotPayload) -> Result<()> {
    let id = match payload.id {
        ItemRef::Id(id) => id,
        ItemRef::CurrentFile => root
            .current_file_id
            .ok_or(TreeError::UnresolvedReference(ItemRef::CurrentFile))?,
        ItemRef::CurrentFolder => root
            .current_folder_id
            .ok_or(TreeError::UnresolvedReference(ItemRef::CurrentFolder))?,
    };

    let now = Utc::now();
    match locate(&root.folders, id).ok_or(TreeError::UnknownId(id))? {
        Location::Folder { folder } => {
            let folder = &mut root.folders[folder];
            folder.name = payload.new_name;
            folder.updated_at = Some(now);
        }
        Location::File { folder, file } => {
            let file = &mut root.folders[folder].files[file];
            file.title = payload.new_name;
            file.updated_at = now;
        }
        Location::Content { .. } => return Err(TreeError::NotRenamable(id)),
    }
    Ok(())
}

fn update_item(root: &mut FolderStructureRoot, payload: UpdateItemPayload) -> Result<()> {
    let id = payload.id;
    let location = locate(&root.folders, id).ok_or(TreeError::UnknownId(id))?;
    let node = node_at(&root.folders, location).ok_or(TreeError::UnknownId(id))?;

    let expected = node.type_name();
    let found = payload
        .content_item
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("none");
    if expected != found {
        return Err(TreeError::TypeMismatch {
            id,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    let patch = payload
        .content_item
        .as_object()
        .ok_or_else(|| TreeError::InvalidUpdate("content item must be an object".to_string()))?;
    if let Some(new_id) = patch.get("id") {
        if new_id.as_u64() != Some(id) {
            return Err(TreeError::InvalidUpdate("id cannot be changed".to_string()));
        }
    }

    let before = subtree_ids(node);
    let mut merged = match node {
        NodeRef::Folder(f) => serde_json::to_value(f)?,
        NodeRef::File(f) => serde_json::to_value(f)?,
        NodeRef::Content(c) => serde_json::to_value(c)?,
    };
    if let Some(fields) = merged.as_object_mut() {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
        fields.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
    }

    let invalid = |e: serde_json::Error| TreeError::InvalidUpdate(e.to_string());
    match location {
        Location::Folder { folder } => {
            let updated: Folder = serde_json::from_value(merged).map_err(invalid)?;
            updated.files.iter().try_for_each(check_file_content)?;
            sync_ids(&mut root.ids, &before, &subtree_ids(NodeRef::Folder(&updated)))?;
            root.folders[folder] = updated;
            drop_dangling_selection(root);
        }
        Location::File { folder, file } => {
            let updated: DataFile = serde_json::from_value(merged).map_err(invalid)?;
            check_file_content(&updated)?;
            sync_ids(&mut root.ids, &before, &subtree_ids(NodeRef::File(&updated)))?;
            root.folders[folder].files[file] = updated;
            drop_dangling_selection(root);
        }
        Location::Content {
            folder,
            file,
            content,
        } => {
            let updated: ContentItem = serde_json::from_value(merged).map_err(invalid)?;
            root.folders[folder].files[file].content[content] = updated;
        }
    }
    Ok(())
}

/// Register ids introduced by a merge and drop the ones it removed
fn check_file_content(file: &DataFile) -> Result<()> {
    match file.content.iter().find(|item| !file.kind.accepts(item.kind())) {
        Some(item) => Err(TreeError::IncompatibleContent {
            file: file.kind,
            content: item.kind(),
        }),
        None => Ok(()),
    }
}

/// Clear a selection the last update removed from the tree
fn drop_dangling_selection(root: &mut FolderStructureRoot) {
    let file_gone = root
        .current_file_id
        .map_or(false, |id| find_file(&root.folders, id).is_none());
    let folder_gone = root
        .current_folder_id
        .map_or(false, |id| find_folder(&root.folders, id).is_none());
    if file_gone {
        root.current_file_id = None;
    }
    if folder_gone {
        root.current_folder_id = None;
    }
    if file_gone || folder_gone {
        root.current_page = Page::Home;
    }
}

fn sync_ids(ids: &mut IdSet, before: &[Id], after: &[Id]) -> Result<()> {
    let mut seen = IdSet::new();
    if let Some(&duplicate) = after.iter().find(|id| !seen.insert(**id)) {
        return Err(TreeError::IdCollision(duplicate));
    }
    let added: Vec<Id> = after.iter().copied().filter(|id| !before.contains(id)).collect();
    if let Some(&collision) = added.iter().find(|id| ids.contains(**id)) {
        return Err(TreeError::IdCollision(collision));
    }
    for id in before.iter().filter(|id| !after.contains(id)) {
        ids.remove(*id);
    }
    ids.extend(added);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::get_item_by_id;
    use serde_json::json;
    use studyhub_types::{
        DeleteItemInFilePayload, DeleteItemPayload, ResetAnswersPayload, SelectAnswerPayload,
    };

    fn dispatch(state: &TreeState, action: Action, persistence: &PersistenceAdapter) -> TreeState {
        reduce(state, action, persistence)
    }

    fn root(state: &TreeState) -> &FolderStructureRoot {
        state.sorted_data.as_ref().expect("state is loaded")
    }

    fn add_folder_action(name: &str, set_active: bool) -> Action {
        Action::AddFolder(AddFolderPayload {
            name: name.to_string(),
            created_at: None,
            set_active,
        })
    }

    fn add_file_action(kind: &str, title: &str, set_active: bool) -> Action {
        Action::AddFile(AddFilePayload {
            kind: kind.to_string(),
            title: title.to_string(),
            set_active,
            content: Vec::new(),
            source_document_id: None,
        })
    }

    fn question_action(question: &str, answers: &[&str], correct: &str) -> Action {
        Action::AddContent(AddContentPayload {
            kind: "question".to_string(),
            content_item: json!({
                "type": "question",
                "items": {"question": question, "answers": answers, "correctAnswer": correct}
            }),
        })
    }

    fn text_action(text: &str, is_ai: bool) -> Action {
        Action::AddContent(AddContentPayload {
            kind: "text".to_string(),
            content_item: json!({"type": "text", "items": text, "isAiResponse": is_ai}),
        })
    }

    /// Empty tree with one active folder holding one active file of `kind`
    fn with_active_file(kind: &str, persistence: &PersistenceAdapter) -> TreeState {
        let state = dispatch(&TreeState::empty(), add_folder_action("School", true), persistence);
        dispatch(&state, add_file_action(kind, "Untitled", true), persistence)
    }

    #[test]
    fn test_quiz_scenario_adds_one_question() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, question_action("2+2?", &["3", "4", "5", "6"], "4"), &p);

        assert!(state.error_message.is_none());
        let root = root(&state);
        let content = &root.folders[0].files[0].content;
        assert_eq!(content.len(), 1);
        let question = content[0].as_question().unwrap();
        assert_eq!(question.items.question, "2+2?");
        assert_eq!(question.items.answers, vec!["3", "4", "5", "6"]);
        assert_eq!(question.items.correct_answer, "4");
        assert!(root.ids.contains(question.id));
        assert_eq!(root.current_page, Page::Quiz);
    }

    #[test]
    fn test_rename_current_file_without_selection_fails() {
        let p = PersistenceAdapter::in_memory();
        let before = dispatch(&TreeState::empty(), add_folder_action("School", false), &p);
        let after = dispatch(
            &before,
            Action::RenameSlot(RenameSlotPayload {
                id: ItemRef::CurrentFile,
                new_name: "Algebra Quiz".to_string(),
            }),
            &p,
        );

        assert!(after.error_message.is_some());
        assert_eq!(after.sorted_data, before.sorted_data);
    }

    #[test]
    fn test_failed_action_preserves_state() {
        let p = PersistenceAdapter::in_memory();
        let before = with_active_file("quiz", &p);
        let after = dispatch(
            &before,
            Action::ToggleCurrentFile(FileSelection::Select(424_242)),
            &p,
        );

        assert_eq!(after.error_message.as_deref(), Some("Item not found: 424242"));
        assert_eq!(after.sorted_data, before.sorted_data);
        assert_eq!(after.raw_data, before.raw_data);
    }

    #[test]
    fn test_late_failure_in_add_file_leaves_no_partial_ids() {
        let p = PersistenceAdapter::in_memory();
        let before = dispatch(&TreeState::empty(), add_folder_action("School", true), &p);
        let action = Action::AddFile(AddFilePayload {
            kind: "quiz".to_string(),
            title: "Mixed".to_string(),
            set_active: true,
            content: vec![
                json!({"type": "question", "items": {"question": "ok?", "answers": ["y"], "correctAnswer": "y"}}),
                json!({"type": "question", "items": {"question": "broken"}}),
            ],
            source_document_id: None,
        });
        let after = dispatch(&before, action, &p);

        assert!(after.error_message.is_some());
        assert_eq!(after.sorted_data, before.sorted_data);
        assert_eq!(root(&after).ids.len(), 1);
    }

    #[test]
    fn test_next_success_clears_error() {
        let p = PersistenceAdapter::in_memory();
        let failed = dispatch(&TreeState::empty(), add_file_action("quiz", "Orphan", false), &p);
        assert_eq!(failed.error_message.as_deref(), Some("No current folder selected"));

        let ok = dispatch(&failed, add_folder_action("School", false), &p);
        assert!(ok.error_message.is_none());
    }

    #[test]
    fn test_unloaded_state_rejects_mutations() {
        let p = PersistenceAdapter::in_memory();
        let state = dispatch(&TreeState::default(), add_folder_action("School", false), &p);
        assert_eq!(state.error_message.as_deref(), Some("No data loaded"));
        let saved = dispatch(&TreeState::default(), Action::Save, &p);
        assert!(saved.is_error());
    }

    #[test]
    fn test_toggle_current_folder_twice_restores_selection() {
        let p = PersistenceAdapter::in_memory();
        let state = dispatch(&TreeState::empty(), add_folder_action("School", false), &p);
        let folder_id = root(&state).folders[0].id;

        let once = dispatch(&state, Action::ToggleCurrentFolder(folder_id), &p);
        assert_eq!(root(&once).current_folder_id, Some(folder_id));
        let twice = dispatch(&once, Action::ToggleCurrentFolder(folder_id), &p);
        assert_eq!(root(&twice).current_folder_id, None);
    }

    #[test]
    fn test_toggle_folder_rejects_file_ids() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let file_id = root(&state).folders[0].files[0].id;
        let after = dispatch(&state, Action::ToggleCurrentFolder(file_id), &p);
        assert!(after.is_error());
        assert_eq!(after.sorted_data, state.sorted_data);
    }

    #[test]
    fn test_page_follows_selected_file() {
        let p = PersistenceAdapter::in_memory();
        let state = dispatch(&TreeState::empty(), add_folder_action("School", true), &p);
        let state = dispatch(&state, add_file_action("quiz", "Quiz", false), &p);
        let state = dispatch(&state, add_file_action("conversation", "Chat", false), &p);
        let quiz_id = root(&state).folders[0].files[0].id;
        let chat_id = root(&state).folders[0].files[1].id;

        let state = dispatch(&state, Action::ToggleCurrentFile(FileSelection::Select(quiz_id)), &p);
        assert_eq!(root(&state).current_page, Page::Quiz);

        let state = dispatch(&state, Action::ToggleCurrentFile(FileSelection::Select(chat_id)), &p);
        assert_eq!(root(&state).current_page, Page::Chat);
        assert_eq!(root(&state).current_file_id, Some(chat_id));

        let state = dispatch(&state, Action::ToggleCurrentFile(FileSelection::Select(chat_id)), &p);
        assert_eq!(root(&state).current_page, Page::Home);
        assert_eq!(root(&state).current_file_id, None);
    }

    #[test]
    fn test_clear_selection_sentinel() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("conversation", &p);
        assert_eq!(root(&state).current_page, Page::Chat);

        let state = dispatch(&state, Action::ToggleCurrentFile(FileSelection::Clear), &p);
        assert!(!state.is_error());
        assert_eq!(root(&state).current_file_id, None);
        assert_eq!(root(&state).current_page, Page::Home);
    }

    #[test]
    fn test_set_page_home_clears_selection() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, Action::SetPage(Page::Library), &p);
        assert_eq!(root(&state).current_page, Page::Library);
        assert!(root(&state).current_file_id.is_some());

        let state = dispatch(&state, Action::SetPage(Page::Home), &p);
        assert_eq!(root(&state).current_folder_id, None);
        assert_eq!(root(&state).current_file_id, None);
    }

    #[test]
    fn test_delete_folder_cascades_selection_and_ids() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, question_action("2+2?", &["4"], "4"), &p);
        let folder_id = root(&state).folders[0].id;

        let state = dispatch(&state, Action::DeleteItem(DeleteItemPayload { id: folder_id }), &p);
        let root = root(&state);
        assert!(state.error_message.is_none());
        assert!(root.folders.is_empty());
        assert_eq!(root.current_file_id, None);
        assert_eq!(root.current_folder_id, None);
        assert_eq!(root.current_page, Page::Home);
        assert!(root.ids.is_empty());
    }

    #[test]
    fn test_delete_other_folder_keeps_selection() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, add_folder_action("Spare", false), &p);
        let spare_id = root(&state).folders[1].id;

        let after = dispatch(&state, Action::DeleteItem(DeleteItemPayload { id: spare_id }), &p);
        assert_eq!(root(&after).folders.len(), 1);
        assert_eq!(root(&after).current_file_id, root(&state).current_file_id);
        assert_eq!(root(&after).current_page, Page::Quiz);
    }

    #[test]
    fn test_delete_content_item() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("conversation", &p);
        let state = dispatch(&state, text_action("hi", false), &p);
        let state = dispatch(&state, text_action("hello!", true), &p);
        let first_id = root(&state).folders[0].files[0].content[0].id();

        let state = dispatch(&state, Action::DeleteItem(DeleteItemPayload { id: first_id }), &p);
        let content = &root(&state).folders[0].files[0].content;
        assert_eq!(content.len(), 1);
        assert!(!root(&state).ids.contains(first_id));

        let missing = dispatch(&state, Action::DeleteItem(DeleteItemPayload { id: first_id }), &p);
        assert!(missing.is_error());
    }

    #[test]
    fn test_delete_item_in_file_by_created_at() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("conversation", &p);
        let state = dispatch(&state, text_action("first", false), &p);
        let created_at = root(&state).folders[0].files[0].content[0].created_at();

        let state = dispatch(
            &state,
            Action::DeleteItemInFile(DeleteItemInFilePayload { created_at }),
            &p,
        );
        assert!(!state.is_error());
        assert!(root(&state).folders[0].files[0].content.is_empty());
    }

    #[test]
    fn test_delete_item_in_file_requires_current_file() {
        let p = PersistenceAdapter::in_memory();
        let state = dispatch(
            &TreeState::empty(),
            Action::DeleteItemInFile(DeleteItemInFilePayload {
                created_at: Utc::now(),
            }),
            &p,
        );
        assert_eq!(state.error_message.as_deref(), Some("No current file selected"));
    }

    #[test]
    fn test_add_content_validation() {
        let p = PersistenceAdapter::in_memory();
        let quiz = with_active_file("quiz", &p);

        let mismatch = Action::AddContent(AddContentPayload {
            kind: "question".to_string(),
            content_item: json!({"type": "text", "items": "hi"}),
        });
        assert!(dispatch(&quiz, mismatch, &p).is_error());

        let malformed = Action::AddContent(AddContentPayload {
            kind: "question".to_string(),
            content_item: json!({"type": "question", "items": {"question": "?", "answers": "a,b"}}),
        });
        assert!(dispatch(&quiz, malformed, &p).is_error());

        let text_in_quiz = dispatch(&quiz, text_action("hi", false), &p);
        assert!(text_in_quiz.is_error());

        let image = Action::AddContent(AddContentPayload {
            kind: "image".to_string(),
            content_item: json!({"type": "image", "items": "cat.png"}),
        });
        assert_eq!(
            dispatch(&quiz, image, &p).error_message.as_deref(),
            Some("image content is not supported yet")
        );

        let chat = with_active_file("conversation", &p);
        let bad_text = Action::AddContent(AddContentPayload {
            kind: "text".to_string(),
            content_item: json!({"type": "text", "items": 42}),
        });
        assert!(dispatch(&chat, bad_text, &p).is_error());
    }

    #[test]
    fn test_add_file_rejects_unknown_type() {
        let p = PersistenceAdapter::in_memory();
        let state = dispatch(&TreeState::empty(), add_folder_action("School", true), &p);
        let after = dispatch(&state, add_file_action("essay", "Essay", false), &p);
        assert_eq!(after.error_message.as_deref(), Some("Invalid file type: essay"));
    }

    #[test]
    fn test_add_content_lookup_round_trip() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("conversation", &p);
        let state = dispatch(&state, text_action("What is DNA?", false), &p);
        let root = root(&state);

        let item = &root.folders[0].files[0].content[0];
        let found = get_item_by_id(&root.folders, item.id()).unwrap();
        assert_eq!(found.as_content(), Some(item));

        let file = &root.folders[0].files[0];
        assert_eq!(get_item_by_id(&root.folders, file.id).unwrap().as_file(), Some(file));
    }

    #[test]
    fn test_rename_slots() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(
            &state,
            Action::RenameSlot(RenameSlotPayload {
                id: ItemRef::CurrentFile,
                new_name: "Algebra Quiz".to_string(),
            }),
            &p,
        );
        let state = dispatch(
            &state,
            Action::RenameSlot(RenameSlotPayload {
                id: ItemRef::CurrentFolder,
                new_name: "Math".to_string(),
            }),
            &p,
        );
        assert!(!state.is_error());
        assert_eq!(root(&state).folders[0].name, "Math");
        assert_eq!(root(&state).folders[0].files[0].title, "Algebra Quiz");

        let state = dispatch(&state, question_action("?", &["a"], "a"), &p);
        let question_id = root(&state).folders[0].files[0].content[0].id();
        let renamed = dispatch(
            &state,
            Action::RenameSlot(RenameSlotPayload {
                id: ItemRef::Id(question_id),
                new_name: "nope".to_string(),
            }),
            &p,
        );
        assert!(renamed.is_error());
    }

    #[test]
    fn test_update_item_merges_fields() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, question_action("2+2?", &["3", "4"], "3"), &p);
        let id = root(&state).folders[0].files[0].content[0].id();

        let fixed = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id,
                content_item: json!({
                    "type": "question",
                    "items": {"question": "2+2?", "answers": ["3", "4"], "correctAnswer": "4"}
                }),
            }),
            &p,
        );
        assert!(!fixed.is_error());
        let item = &root(&fixed).folders[0].files[0].content[0];
        assert_eq!(item.as_question().unwrap().items.correct_answer, "4");
        assert!(item.updated_at().is_some());
        assert_eq!(item.id(), id);

        let wrong_type = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id,
                content_item: json!({"type": "text", "items": "hi"}),
            }),
            &p,
        );
        assert!(wrong_type.is_error());

        let new_id = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id,
                content_item: json!({"type": "question", "id": 1}),
            }),
            &p,
        );
        assert!(new_id.is_error());
    }

    #[test]
    fn test_update_file_content_replace_syncs_ids() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, question_action("old?", &["a"], "a"), &p);
        let file = root(&state).folders[0].files[0].clone();
        let old_id = file.content[0].id();

        let replaced = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: file.id,
                content_item: json!({
                    "type": "quiz",
                    "content": [{
                        "id": 7,
                        "type": "question",
                        "items": {"question": "new?", "answers": ["b"], "correctAnswer": "b"},
                        "createdAt": "2024-03-01T10:00:00Z"
                    }]
                }),
            }),
            &p,
        );
        assert!(!replaced.is_error(), "{:?}", replaced.error_message);
        let ids = &root(&replaced).ids;
        assert!(ids.contains(7));
        assert!(!ids.contains(old_id));

        let folder_id = root(&state).folders[0].id;
        let collision = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: file.id,
                content_item: json!({
                    "type": "quiz",
                    "content": [{
                        "id": folder_id,
                        "type": "question",
                        "items": {"question": "new?", "answers": ["b"], "correctAnswer": "b"},
                        "createdAt": "2024-03-01T10:00:00Z"
                    }]
                }),
            }),
            &p,
        );
        assert!(collision.is_error());
        assert_eq!(collision.sorted_data, state.sorted_data);
    }

    #[test]
    fn test_update_folder_dropping_current_file_clears_selection() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, question_action("2+2?", &["4"], "4"), &p);
        let folder = root(&state).folders[0].clone();
        let file = folder.files[0].clone();
        let question_id = file.content[0].id();
        assert_eq!(root(&state).current_file_id, Some(file.id));

        let emptied = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: folder.id,
                content_item: json!({"type": "folder", "files": []}),
            }),
            &p,
        );
        assert!(!emptied.is_error(), "{:?}", emptied.error_message);
        let tree = root(&emptied);
        assert_eq!(tree.current_file_id, None);
        assert_eq!(tree.current_folder_id, Some(folder.id));
        assert_eq!(tree.current_page, Page::Home);
        assert!(!tree.ids.contains(file.id));
        assert!(!tree.ids.contains(question_id));
        assert!(tree.ids.contains(folder.id));
    }

    #[test]
    fn test_update_rejects_incompatible_content() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let folder = root(&state).folders[0].clone();
        let file_id = folder.files[0].id;
        let text_item = json!({
            "id": 90,
            "type": "text",
            "items": "not a question",
            "createdAt": "2024-03-01T10:00:00Z"
        });

        let via_file = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: file_id,
                content_item: json!({"type": "quiz", "content": [text_item.clone()]}),
            }),
            &p,
        );
        assert!(via_file.is_error());
        assert_eq!(via_file.sorted_data, state.sorted_data);

        let mut files = serde_json::to_value(&folder.files).unwrap();
        files[0]["content"] = json!([text_item]);
        let via_folder = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: folder.id,
                content_item: json!({"type": "folder", "files": files}),
            }),
            &p,
        );
        assert!(via_folder.is_error());
        assert_eq!(via_folder.sorted_data, state.sorted_data);

        let retyped = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: file_id,
                content_item: json!({"type": "quiz", "content": []}),
            }),
            &p,
        );
        assert!(!retyped.is_error(), "{:?}", retyped.error_message);
    }

    #[test]
    fn test_update_rejects_duplicate_ids() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let file_id = root(&state).folders[0].files[0].id;
        let question = |id: u64| {
            json!({
                "id": id,
                "type": "question",
                "items": {"question": "q?", "answers": ["a"], "correctAnswer": "a"},
                "createdAt": "2024-03-01T10:00:00Z"
            })
        };

        let duplicated = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: file_id,
                content_item: json!({"type": "quiz", "content": [question(9), question(9)]}),
            }),
            &p,
        );
        assert!(duplicated.is_error());
        assert_eq!(duplicated.sorted_data, state.sorted_data);
        assert!(!root(&duplicated).ids.contains(9));

        let self_reference = dispatch(
            &state,
            Action::UpdateItem(UpdateItemPayload {
                id: file_id,
                content_item: json!({"type": "quiz", "content": [question(file_id)]}),
            }),
            &p,
        );
        assert!(self_reference.is_error());
        assert_eq!(self_reference.sorted_data, state.sorted_data);
    }

    #[test]
    fn test_select_and_reset_answers() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let state = dispatch(&state, question_action("2+2?", &["3", "4"], "4"), &p);
        let id = root(&state).folders[0].files[0].content[0].id();

        let wrong = dispatch(
            &state,
            Action::SelectAnswer(SelectAnswerPayload {
                id,
                answer: "3".to_string(),
            }),
            &p,
        );
        let items = &root(&wrong).folders[0].files[0].content[0].as_question().unwrap().items;
        assert_eq!(items.selected_answer.as_deref(), Some("3"));
        assert_eq!(items.is_correct, Some(false));

        let invalid = dispatch(
            &wrong,
            Action::SelectAnswer(SelectAnswerPayload {
                id,
                answer: "22".to_string(),
            }),
            &p,
        );
        assert!(invalid.is_error());

        let reset = dispatch(&wrong, Action::ResetAnswers(ResetAnswersPayload::default()), &p);
        let items = &root(&reset).folders[0].files[0].content[0].as_question().unwrap().items;
        assert!(items.selected_answer.is_none());
        assert!(items.is_correct.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let saved = dispatch(&state, Action::Save, &p);
        assert!(!saved.is_error());
        assert_eq!(saved.raw_data, p.load().unwrap());

        let loaded = dispatch(&TreeState::default(), Action::Load, &p);
        let root = root(&loaded);
        assert_eq!(root.folders, state.sorted_data.as_ref().unwrap().folders);
        assert_eq!(root.current_page, Page::Home);
        assert!(root.current_folder_id.is_none());
        assert!(root.current_file_id.is_none());
    }

    #[test]
    fn test_load_with_corrupt_storage_falls_back() {
        let p = PersistenceAdapter::in_memory();
        p.store().set(p.key(), "[not, an, object").unwrap();
        let loaded = dispatch(&TreeState::default(), Action::Load, &p);
        assert!(!loaded.is_error());
        assert!(root(&loaded).folders.is_empty());
        assert!(convert_to_sorted_json(loaded.raw_data.as_deref().unwrap()).is_some());
    }

    #[test]
    fn test_load_reconciles_missing_ids() {
        let p = PersistenceAdapter::in_memory();
        let state = with_active_file("quiz", &p);
        let mut stored = state.sorted_data.clone().unwrap();
        stored.ids = IdSet::new();
        p.save(&stored).unwrap();

        let loaded = dispatch(&TreeState::default(), Action::Load, &p);
        assert_eq!(root(&loaded).ids, collect_ids(&root(&loaded).folders));
        assert_eq!(root(&loaded).ids.len(), 2);
    }
}
