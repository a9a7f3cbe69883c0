//! Tree lookup utilities
//!
//! Depth-first search over folders -> files -> content items. Content
//! payloads are never descended into: question items carry no ids of
//! their own. Every lookup returns `None` on a miss.

use studyhub_types::{ContentItem, DataFile, Folder, Id, IdSet};

/// A borrowed tree node of any kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Folder(&'a Folder),
    File(&'a DataFile),
    Content(&'a ContentItem),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> Id {
        match self {
            NodeRef::Folder(f) => f.id,
            NodeRef::File(f) => f.id,
            NodeRef::Content(c) => c.id(),
        }
    }

    /// Value of the node's `type` field
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeRef::Folder(_) => "folder",
            NodeRef::File(f) => f.kind.as_str(),
            NodeRef::Content(c) => c.kind().as_str(),
        }
    }

    pub fn as_folder(&self) -> Option<&'a Folder> {
        match self {
            NodeRef::Folder(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&'a DataFile> {
        match self {
            NodeRef::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_content(&self) -> Option<&'a ContentItem> {
        match self {
            NodeRef::Content(c) => Some(c),
            _ => None,
        }
    }
}

/// The structural container of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParentRef<'a> {
    /// The top-level folder list
    Root,
    Folder(&'a Folder),
    File(&'a DataFile),
}

/// Index path from the root folder list down to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Folder {
        folder: usize,
    },
    File {
        folder: usize,
        file: usize,
    },
    Content {
        folder: usize,
        file: usize,
        content: usize,
    },
}

impl Location {
    /// Location of the enclosing node, `None` for a top-level folder
    pub fn parent(&self) -> Option<Location> {
        match *self {
            Location::Folder { .. } => None,
            Location::File { folder, .. } => Some(Location::Folder { folder }),
            Location::Content { folder, file, .. } => Some(Location::File { folder, file }),
        }
    }
}

/// Find where the node with `id` lives
pub fn locate(folders: &[Folder], id: Id) -> Option<Location> {
    for (fi, folder) in folders.iter().enumerate() {
        if folder.id == id {
            return Some(Location::Folder { folder: fi });
        }
        for (di, file) in folder.files.iter().enumerate() {
            if file.id == id {
                return Some(Location::File {
                    folder: fi,
                    file: di,
                });
            }
            if let Some(ci) = file.content.iter().position(|c| c.id() == id) {
                return Some(Location::Content {
                    folder: fi,
                    file: di,
                    content: ci,
                });
            }
        }
    }
    None
}

/// Resolve a location back to a node
pub fn node_at(folders: &[Folder], location: Location) -> Option<NodeRef<'_>> {
    match location {
        Location::Folder { folder } => folders.get(folder).map(NodeRef::Folder),
        Location::File { folder, file } => folders
            .get(folder)
            .and_then(|f| f.files.get(file))
            .map(NodeRef::File),
        Location::Content {
            folder,
            file,
            content,
        } => folders
            .get(folder)
            .and_then(|f| f.files.get(file))
            .and_then(|f| f.content.get(content))
            .map(NodeRef::Content),
    }
}

/// Find a folder, file or content item by id
pub fn get_item_by_id(folders: &[Folder], id: Id) -> Option<NodeRef<'_>> {
    locate(folders, id).and_then(|loc| node_at(folders, loc))
}

/// Find the immediate container of the node with `id`
pub fn get_parent_by_item_id(folders: &[Folder], id: Id) -> Option<ParentRef<'_>> {
    let location = locate(folders, id)?;
    match location.parent() {
        None => Some(ParentRef::Root),
        Some(parent) => match node_at(folders, parent)? {
            NodeRef::Folder(f) => Some(ParentRef::Folder(f)),
            NodeRef::File(f) => Some(ParentRef::File(f)),
            NodeRef::Content(_) => None,
        },
    }
}

pub fn find_folder(folders: &[Folder], id: Id) -> Option<&Folder> {
    folders.iter().find(|f| f.id == id)
}

pub fn find_folder_mut(folders: &mut [Folder], id: Id) -> Option<&mut Folder> {
    folders.iter_mut().find(|f| f.id == id)
}

pub fn find_file(folders: &[Folder], id: Id) -> Option<&DataFile> {
    folders
        .iter()
        .flat_map(|f| f.files.iter())
        .find(|f| f.id == id)
}

pub fn find_file_mut(folders: &mut [Folder], id: Id) -> Option<&mut DataFile> {
    folders
        .iter_mut()
        .flat_map(|f| f.files.iter_mut())
        .find(|f| f.id == id)
}

pub fn find_content_mut(folders: &mut [Folder], id: Id) -> Option<&mut ContentItem> {
    folders
        .iter_mut()
        .flat_map(|f| f.files.iter_mut())
        .flat_map(|f| f.content.iter_mut())
        .find(|c| c.id() == id)
}

/// The folder holding file `file_id`
pub fn folder_of_file(folders: &[Folder], file_id: Id) -> Option<&Folder> {
    folders
        .iter()
        .find(|folder| folder.files.iter().any(|f| f.id == file_id))
}

/// Ids of a node and everything below it
pub fn subtree_ids(node: NodeRef<'_>) -> Vec<Id> {
    match node {
        NodeRef::Folder(folder) => {
            let mut ids = vec![folder.id];
            for file in &folder.files {
                ids.extend(subtree_ids(NodeRef::File(file)));
            }
            ids
        }
        NodeRef::File(file) => std::iter::once(file.id)
            .chain(file.content.iter().map(|c| c.id()))
            .collect(),
        NodeRef::Content(c) => vec![c.id()],
    }
}

/// Every id present anywhere in the tree
pub fn collect_ids(folders: &[Folder]) -> IdSet {
    folders
        .iter()
        .flat_map(|f| subtree_ids(NodeRef::Folder(f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use studyhub_types::{FileKind, FolderTag, TextContentItem};

    fn sample() -> Vec<Folder> {
        let now = Utc::now();
        let text = ContentItem::Text(TextContentItem {
            id: 100,
            items: "hello".to_string(),
            is_ai_response: false,
            created_at: now,
            updated_at: None,
        });
        let file = DataFile {
            id: 10,
            kind: FileKind::Conversation,
            title: "Chat".to_string(),
            created_at: now,
            updated_at: now,
            content: vec![text],
            source_document_id: None,
        };
        vec![
            Folder {
                id: 1,
                name: "Empty".to_string(),
                tag: FolderTag::Folder,
                created_at: now,
                updated_at: None,
                files: Vec::new(),
            },
            Folder {
                id: 2,
                name: "Biology".to_string(),
                tag: FolderTag::Folder,
                created_at: now,
                updated_at: None,
                files: vec![file],
            },
        ]
    }

    #[test]
    fn test_get_item_by_id_finds_every_kind() {
        let folders = sample();
        assert_eq!(get_item_by_id(&folders, 2).unwrap().type_name(), "folder");
        assert_eq!(
            get_item_by_id(&folders, 10).unwrap().as_file().unwrap().title,
            "Chat"
        );
        assert_eq!(get_item_by_id(&folders, 100).unwrap().type_name(), "text");
        assert!(get_item_by_id(&folders, 999).is_none());
    }

    #[test]
    fn test_get_parent_by_item_id() {
        let folders = sample();
        assert_eq!(get_parent_by_item_id(&folders, 1), Some(ParentRef::Root));
        match get_parent_by_item_id(&folders, 10) {
            Some(ParentRef::Folder(f)) => assert_eq!(f.id, 2),
            other => panic!("unexpected parent: {:?}", other),
        }
        match get_parent_by_item_id(&folders, 100) {
            Some(ParentRef::File(f)) => assert_eq!(f.id, 10),
            other => panic!("unexpected parent: {:?}", other),
        }
        assert!(get_parent_by_item_id(&folders, 999).is_none());
    }

    #[test]
    fn test_empty_tree_lookups_return_none() {
        assert!(get_item_by_id(&[], 1).is_none());
        assert!(get_parent_by_item_id(&[], 1).is_none());
        assert!(collect_ids(&[]).is_empty());
    }

    #[test]
    fn test_collect_ids_covers_subtrees() {
        let folders = sample();
        assert_eq!(collect_ids(&folders).sorted(), vec![1, 2, 10, 100]);
        assert_eq!(folder_of_file(&folders, 10).map(|f| f.id), Some(2));
    }
}
