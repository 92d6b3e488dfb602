//! In-memory ordered bookmark collection
//!
//! The `EntryStore` owns the canonical in-memory sequence of bookmarks for
//! a session. All operations are synchronous and total: each one is a
//! single deterministic transform of the current collection, which is what
//! lets the session apply them in dispatch order without locking beyond a
//! plain mutex.
//!
//! Ordering invariant: entries are sorted by `created_at` descending, ties
//! broken most-recently-inserted first. Identity invariant: no two entries
//! share an id.

use thiserror::Error;

use crate::models::{Bookmark, BookmarkId};

/// Errors signalled by collection transitions
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// An insert would have introduced a second entry with the same id
    #[error("duplicate bookmark id: {0}")]
    DuplicateId(BookmarkId),
}

/// The ordered collection of bookmarks visible to the UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryStore {
    entries: Vec<Bookmark>,
}

impl EntryStore {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a seed listing
    ///
    /// Records with an id already present are skipped, so a seed that
    /// (incorrectly) carries duplicates still yields a valid collection.
    pub fn seeded(records: impl IntoIterator<Item = Bookmark>) -> Self {
        let mut store = Self::new();
        for record in records {
            let _ = store.insert_front(record);
        }
        store
    }

    /// Insert a record, re-establishing sort order
    ///
    /// Fails without mutating if the record's id is already present.
    pub fn insert_front(&mut self, record: Bookmark) -> Result<(), StoreError> {
        if self.contains(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        self.entries.insert(0, record);
        self.resort();
        Ok(())
    }

    /// Remove and return the record with the given id
    ///
    /// Removing an absent id is not an error.
    pub fn remove_by_id(&mut self, id: &BookmarkId) -> Option<Bookmark> {
        let pos = self.entries.iter().position(|b| b.id == *id)?;
        Some(self.entries.remove(pos))
    }

    /// Atomically replace the entry at `old_id` with `new_record`
    ///
    /// If `old_id` is absent (already removed by a racing remote event),
    /// falls back to a plain insert. If `new_record.id` is already present
    /// (a remote echo landed first), the existing entry is kept and only
    /// the removal applies. Returns whether the collection changed.
    pub fn replace_id(&mut self, old_id: &BookmarkId, new_record: Bookmark) -> bool {
        let removed = self.remove_by_id(old_id).is_some();
        let inserted = self.insert_front(new_record).is_ok();
        removed || inserted
    }

    /// Whether an entry with this id is present
    pub fn contains(&self, id: &BookmarkId) -> bool {
        self.entries.iter().any(|b| b.id == *id)
    }

    /// Get the entry with this id, if present
    pub fn get(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.entries.iter().find(|b| b.id == *id)
    }

    /// Read-only view of the current sort order
    pub fn entries(&self) -> &[Bookmark] {
        &self.entries
    }

    /// Owned copy of the current sort order
    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.entries.clone()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-establish `created_at` descending order.
    ///
    /// The sort is stable and new records enter at the front, so entries
    /// with equal timestamps stay most-recently-inserted first.
    fn resort(&mut self) {
        self.entries
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}
