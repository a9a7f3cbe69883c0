//! Explicit state container around the reducer

use crate::persistence::{convert_to_sorted_json, PersistenceAdapter};
use crate::reducer::reduce;
use studyhub_types::{Action, FolderStructureRoot, TreeState};
use tracing::debug;

/// Owns the committed tree and the storage it is saved to
pub struct TreeStore {
    persistence: PersistenceAdapter,
    state: TreeState,
}

impl TreeStore {
    /// Store with nothing loaded yet; dispatch `LOAD` to populate it
    pub fn new(persistence: PersistenceAdapter) -> Self {
        Self {
            persistence,
            state: TreeState::default(),
        }
    }

    /// Rehydrate the stored tree as-is, keeping its selection and page.
    /// Falls back to `LOAD` when nothing usable is stored.
    pub fn open(persistence: PersistenceAdapter) -> Self {
        let stored = persistence.load().ok().flatten();
        match stored.as_deref().and_then(convert_to_sorted_json) {
            Some(root) => {
                debug!("Rehydrated stored tree ({} folders)", root.folders.len());
                Self {
                    persistence,
                    state: TreeState {
                        raw_data: stored,
                        sorted_data: Some(root),
                        error_message: None,
                    },
                }
            }
            None => {
                let mut store = Self::new(persistence);
                store.dispatch(Action::Load);
                store
            }
        }
    }

    pub fn dispatch(&mut self, action: Action) -> &TreeState {
        self.state = reduce(&self.state, action, &self.persistence);
        &self.state
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn root(&self) -> Option<&FolderStructureRoot> {
        self.state.sorted_data.as_ref()
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }
}
