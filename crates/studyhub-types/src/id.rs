//! Identifier types

use serde::{ser, Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use thiserror::Error;

/// Numeric identifier shared by folders, files and content items
pub type Id = u64;

/// Wire value meaning "the currently selected file"
pub const CURRENT_FILE_SENTINEL: i64 = -1;

/// Wire value meaning "the currently selected folder"
pub const CURRENT_FOLDER_SENTINEL: i64 = -2;

/// Set of every id in use anywhere in the tree.
///
/// Serialized as a sorted JSON array of numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Id>", into = "Vec<Id>")]
pub struct IdSet(HashSet<Id>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.0.contains(&id)
    }

    /// Returns `false` when the id was already present
    pub fn insert(&mut self, id: Id) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: Id) -> bool {
        self.0.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.0.iter().copied()
    }

    /// Ids in ascending order
    pub fn sorted(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.0.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl From<Vec<Id>> for IdSet {
    fn from(ids: Vec<Id>) -> Self {
        Self(ids.into_iter().collect())
    }
}

impl From<IdSet> for Vec<Id> {
    fn from(set: IdSet) -> Self {
        set.sorted()
    }
}

impl FromIterator<Id> for IdSet {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Id> for IdSet {
    fn extend<I: IntoIterator<Item = Id>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid item reference: {0}")]
    InvalidReference(i64),

    #[error("Id {0} is too large for the wire format")]
    IdOutOfRange(Id),
}

fn id_to_wire(id: Id) -> Result<i64, ReferenceError> {
    i64::try_from(id).map_err(|_| ReferenceError::IdOutOfRange(id))
}

/// Addressable entity in an action payload.
///
/// On the wire this stays a plain integer: `-1` is the current file,
/// `-2` the current folder, anything non-negative a literal id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "i64")]
pub enum ItemRef {
    Id(Id),
    CurrentFile,
    CurrentFolder,
}

impl TryFrom<i64> for ItemRef {
    type Error = ReferenceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            CURRENT_FILE_SENTINEL => Ok(ItemRef::CurrentFile),
            CURRENT_FOLDER_SENTINEL => Ok(ItemRef::CurrentFolder),
            v if v >= 0 => Ok(ItemRef::Id(v as Id)),
            v => Err(ReferenceError::InvalidReference(v)),
        }
    }
}

impl TryFrom<ItemRef> for i64 {
    type Error = ReferenceError;

    fn try_from(r: ItemRef) -> Result<Self, Self::Error> {
        match r {
            ItemRef::Id(id) => id_to_wire(id),
            ItemRef::CurrentFile => Ok(CURRENT_FILE_SENTINEL),
            ItemRef::CurrentFolder => Ok(CURRENT_FOLDER_SENTINEL),
        }
    }
}

impl Serialize for ItemRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = i64::try_from(*self).map_err(ser::Error::custom)?;
        serializer.serialize_i64(wire)
    }
}

impl From<Id> for ItemRef {
    fn from(id: Id) -> Self {
        ItemRef::Id(id)
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "{}", id),
            ItemRef::CurrentFile => write!(f, "current file"),
            ItemRef::CurrentFolder => write!(f, "current folder"),
        }
    }
}

/// Payload of the file toggle: a file id, or `-1` on the wire to deselect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum FileSelection {
    Select(Id),
    Clear,
}

impl TryFrom<i64> for FileSelection {
    type Error = ReferenceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            CURRENT_FILE_SENTINEL => Ok(FileSelection::Clear),
            v if v >= 0 => Ok(FileSelection::Select(v as Id)),
            v => Err(ReferenceError::InvalidReference(v)),
        }
    }
}

impl TryFrom<FileSelection> for i64 {
    type Error = ReferenceError;

    fn try_from(s: FileSelection) -> Result<Self, Self::Error> {
        match s {
            FileSelection::Select(id) => id_to_wire(id),
            FileSelection::Clear => Ok(CURRENT_FILE_SENTINEL),
        }
    }
}

impl Serialize for FileSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = i64::try_from(*self).map_err(ser::Error::custom)?;
        serializer.serialize_i64(wire)
    }
}
