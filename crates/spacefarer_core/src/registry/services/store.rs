//! In-memory spacefarer table backing the registry pipeline.
use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use dashmap::{DashMap, Entry};

use crate::registry::{
    error::SpacefarerError,
    infrastructure::model::{Spacefarer, SpacefarerDraft, SpacefarerId, SpacefarerPatch},
};

#[derive(Default, Debug, Clone)]
pub struct SpacefarerStore {
    records: Arc<DashMap<SpacefarerId, Spacefarer>>,
    /// Highest identifier handed out or inserted so far
    last_id: Arc<AtomicU32>,
}

impl SpacefarerStore {
    /// Persists a validated draft.
    ///
    /// Drafts without identifier get the next free one, drafts reusing a
    /// stored identifier are refused.
    pub fn insert(&self, draft: SpacefarerDraft) -> Result<Spacefarer, SpacefarerError> {
        let id = match draft.id {
            Some(id) => {
                self.last_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self
                .last_id
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
                .map(|last| last + 1)
                .map_err(|_| SpacefarerError::IdentifierSpaceExhausted)?,
        };
        match self.records.entry(id) {
            Entry::Occupied(_) => Err(SpacefarerError::DuplicateSpacefarer(id)),
            Entry::Vacant(entry) => {
                let spacefarer = Spacefarer::from_draft(id, draft);
                entry.insert(spacefarer.clone());
                Ok(spacefarer)
            }
        }
    }

    pub fn update(
        &self,
        id: SpacefarerId,
        patch: SpacefarerPatch,
    ) -> Result<Spacefarer, SpacefarerError> {
        let mut record =
            self.records.get_mut(&id).ok_or(SpacefarerError::SpacefarerNotFound(id))?;
        record.apply(patch);
        Ok(record.value().clone())
    }

    pub fn get(&self, id: SpacefarerId) -> Option<Spacefarer> {
        self.records.get(&id).map(|record| record.value().clone())
    }

    /// All records ordered by identifier.
    pub fn list(&self) -> Vec<Spacefarer> {
        let mut records: Vec<Spacefarer> =
            self.records.iter().map(|record| record.value().clone()).collect();
        records.sort_by_key(|record| record.id);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_store_assigns_identifiers_after_explicit_ones() {
        let store = SpacefarerStore::default();
        let first = store.insert(SpacefarerDraft::new("A", "a@b.c", 0)).unwrap();
        let explicit = store.insert(SpacefarerDraft::new("B", "b@b.c", 0).with_id(10)).unwrap();
        let next = store.insert(SpacefarerDraft::new("C", "c@b.c", 0)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(explicit.id, 10);
        assert_eq!(next.id, 11);
        assert_eq!(store.list().iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 10, 11]);
    }

    #[test]
    fn unit_store_exhausted_identifiers() {
        let store = SpacefarerStore::default();
        store.insert(SpacefarerDraft::new("A", "a@b.c", 0).with_id(1)).unwrap();
        store.insert(SpacefarerDraft::new("B", "b@b.c", 0).with_id(u32::MAX)).unwrap();

        assert_eq!(
            store.insert(SpacefarerDraft::new("C", "c@b.c", 0)).unwrap_err(),
            SpacefarerError::IdentifierSpaceExhausted
        );
        // Explicit identifiers below the maximum are still accepted.
        let explicit = store.insert(SpacefarerDraft::new("D", "d@b.c", 0).with_id(2)).unwrap();
        assert_eq!(explicit.id, 2);
        assert_eq!(store.list().iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, u32::MAX]);
    }

    #[test]
    fn unit_store_refuses_duplicates_and_unknown_updates() {
        let store = SpacefarerStore::default();
        store.insert(SpacefarerDraft::new("A", "a@b.c", 0).with_id(1)).unwrap();

        assert_eq!(
            store.insert(SpacefarerDraft::new("A", "a@b.c", 0).with_id(1)).unwrap_err(),
            SpacefarerError::DuplicateSpacefarer(1)
        );
        assert_eq!(
            store.update(2, SpacefarerPatch::default()).unwrap_err(),
            SpacefarerError::SpacefarerNotFound(2)
        );
    }
}
