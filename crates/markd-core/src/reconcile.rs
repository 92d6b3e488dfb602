//! Reconciliation of local and remote collection changes
//!
//! Every transition on the collection, whether it originates from this
//! session's own mutations or from the realtime feed, is expressed as an
//! [`Event`] and applied by [`reduce`]. One reducer, driven from a single
//! ordered queue of completions, is the whole merge law: a record is
//! visible exactly when its current id has been inserted and not
//! subsequently removed. No event is special-cased by origin.
//!
//! The reducer also tracks which ids have been confirmed absent by remote
//! authority (a succeeded local delete, or a remote delete event). That
//! fact supersedes a pending delete-rollback: reinserting a record that
//! another session legitimately deleted would resurrect it.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{Bookmark, BookmarkId};
use crate::store::EntryStore;

/// A collection transition, in the order it was dispatched
#[derive(Debug, Clone)]
pub enum Event {
    /// Optimistic add applied before remote confirmation
    LocalInsert(Bookmark),
    /// Optimistic delete applied before remote confirmation
    LocalRemove(BookmarkId),
    /// Remote create succeeded: the placeholder gives way to the
    /// authoritative record
    AddConfirmed {
        placeholder: BookmarkId,
        record: Bookmark,
    },
    /// Remote create failed: the placeholder entry is withdrawn
    AddRolledBack { placeholder: BookmarkId },
    /// Remote delete succeeded: the id is now confirmed absent
    DeleteConfirmed { id: BookmarkId },
    /// Remote delete failed: the removed record is restored, unless the
    /// id was confirmed absent in the interim
    DeleteRolledBack { snapshot: Bookmark },
    /// The feed reported a row inserted (own echo or another session)
    RemoteInsert(Bookmark),
    /// The feed reported a row deleted
    RemoteDelete(BookmarkId),
}

/// Collection plus the reconciliation facts that outlive single entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    store: EntryStore,
    /// Ids confirmed absent by remote authority
    absent: HashSet<BookmarkId>,
}

impl CollectionState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from a seed listing
    pub fn seeded(records: impl IntoIterator<Item = Bookmark>) -> Self {
        Self {
            store: EntryStore::seeded(records),
            absent: HashSet::new(),
        }
    }

    /// The ordered collection
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Ordered snapshot of the visible collection
    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.store.snapshot()
    }

    /// Whether this id has been confirmed absent by remote authority
    pub fn confirmed_absent(&self, id: &BookmarkId) -> bool {
        self.absent.contains(id)
    }
}

/// Apply one event to the collection state.
///
/// Total and synchronous; returns whether the visible collection changed.
/// Duplicate inserts and absent removals are no-ops, which is what makes
/// out-of-order or duplicate feed delivery harmless.
pub fn reduce(state: &mut CollectionState, event: Event) -> bool {
    match event {
        Event::LocalInsert(record) => match state.store.insert_front(record) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "optimistic insert skipped");
                false
            }
        },

        Event::LocalRemove(id) => state.store.remove_by_id(&id).is_some(),

        Event::AddConfirmed {
            placeholder,
            record,
        } => {
            // The id is authoritative again even if a stale remote delete
            // marked it absent while the create was in flight.
            state.absent.remove(&record.id);
            state.store.replace_id(&placeholder, record)
        }

        Event::AddRolledBack { placeholder } => {
            state.store.remove_by_id(&placeholder).is_some()
        }

        Event::DeleteConfirmed { id } => {
            state.absent.insert(id.clone());
            // Removal was already applied optimistically; this is a guard
            // against the id having been reinserted meanwhile.
            state.store.remove_by_id(&id).is_some()
        }

        Event::DeleteRolledBack { snapshot } => {
            if state.absent.contains(&snapshot.id) {
                debug!(id = %snapshot.id, "rollback superseded by confirmed remote delete");
                return false;
            }
            match state.store.insert_front(snapshot) {
                Ok(()) => true,
                Err(err) => {
                    debug!(%err, "rollback insert skipped");
                    false
                }
            }
        }

        Event::RemoteInsert(record) => {
            if state.store.contains(&record.id) {
                // Our own optimistic entry was already replaced with this
                // id, or a duplicate delivery; either way a no-op.
                return false;
            }
            state.absent.remove(&record.id);
            state.store.insert_front(record).is_ok()
        }

        Event::RemoteDelete(id) => {
            state.absent.insert(id.clone());
            state.store.remove_by_id(&id).is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(id: &str, secs: i64) -> Bookmark {
        Bookmark::confirmed(id, "owner-1", format!("https://{}.com", id), id, ts(secs))
    }

    fn ids(state: &CollectionState) -> Vec<String> {
        state
            .store()
            .entries()
            .iter()
            .map(|b| b.id.to_string())
            .collect()
    }

    #[test]
    fn test_remote_insert_orders_by_created_at() {
        let mut state = CollectionState::seeded(vec![record("a", 100)]);

        assert!(reduce(&mut state, Event::RemoteInsert(record("b", 200))));
        assert_eq!(ids(&state), vec!["b", "a"]);
    }

    #[test]
    fn test_remote_insert_is_idempotent() {
        let mut state = CollectionState::new();
        reduce(&mut state, Event::RemoteInsert(record("a", 100)));

        let once = state.clone();
        let changed = reduce(&mut state, Event::RemoteInsert(record("a", 100)));

        assert!(!changed);
        assert_eq!(state, once);
    }

    #[test]
    fn test_remote_delete_is_idempotent() {
        let mut state = CollectionState::seeded(vec![record("a", 100)]);
        let id = BookmarkId::confirmed("a");

        assert!(reduce(&mut state, Event::RemoteDelete(id.clone())));
        let once = state.clone();

        let changed = reduce(&mut state, Event::RemoteDelete(id));
        assert!(!changed);
        assert_eq!(state, once);
    }

    #[test]
    fn test_add_confirmed_replaces_placeholder() {
        let mut state = CollectionState::new();
        let draft = Bookmark::draft("owner-1", "https://example.com", "Example");
        let placeholder = draft.id.clone();

        reduce(&mut state, Event::LocalInsert(draft));
        reduce(
            &mut state,
            Event::AddConfirmed {
                placeholder,
                record: record("r1", 100),
            },
        );

        assert_eq!(ids(&state), vec!["r1"]);
    }

    #[test]
    fn test_add_confirmed_after_echo_leaves_single_entry() {
        // Scenario: the feed echoes the insert under the authoritative id
        // before the create call returns. Both entries are transiently
        // visible; confirmation removes the placeholder and keeps one r1.
        let mut state = CollectionState::new();
        let draft = Bookmark::draft("owner-1", "https://example.com", "Example");
        let placeholder = draft.id.clone();

        reduce(&mut state, Event::LocalInsert(draft));
        reduce(&mut state, Event::RemoteInsert(record("r1", 100)));
        assert_eq!(state.store().len(), 2);

        reduce(
            &mut state,
            Event::AddConfirmed {
                placeholder,
                record: record("r1", 100),
            },
        );
        assert_eq!(ids(&state), vec!["r1"]);
    }

    #[test]
    fn test_delete_rollback_restores_snapshot() {
        let mut state = CollectionState::seeded(vec![record("x", 50)]);
        let id = BookmarkId::confirmed("x");

        reduce(&mut state, Event::LocalRemove(id));
        assert!(state.store().is_empty());

        let changed = reduce(
            &mut state,
            Event::DeleteRolledBack {
                snapshot: record("x", 50),
            },
        );
        assert!(changed);
        assert_eq!(ids(&state), vec!["x"]);
    }

    #[test]
    fn test_delete_rollback_superseded_by_remote_delete() {
        let mut state = CollectionState::seeded(vec![record("x", 50)]);
        let id = BookmarkId::confirmed("x");

        reduce(&mut state, Event::LocalRemove(id.clone()));
        // Another session deleted the row while our delete was in flight
        reduce(&mut state, Event::RemoteDelete(id.clone()));

        let changed = reduce(
            &mut state,
            Event::DeleteRolledBack {
                snapshot: record("x", 50),
            },
        );
        assert!(!changed);
        assert!(state.store().is_empty());
        assert!(state.confirmed_absent(&id));
    }

    #[test]
    fn test_remote_insert_clears_confirmed_absent() {
        let mut state = CollectionState::new();
        let id = BookmarkId::confirmed("a");

        reduce(&mut state, Event::RemoteDelete(id.clone()));
        assert!(state.confirmed_absent(&id));

        reduce(&mut state, Event::RemoteInsert(record("a", 100)));
        assert!(!state.confirmed_absent(&id));
        assert_eq!(ids(&state), vec!["a"]);
    }

    #[test]
    fn test_delete_confirmed_marks_absent() {
        let mut state = CollectionState::seeded(vec![record("x", 50)]);
        let id = BookmarkId::confirmed("x");

        reduce(&mut state, Event::LocalRemove(id.clone()));
        reduce(&mut state, Event::DeleteConfirmed { id: id.clone() });

        assert!(state.confirmed_absent(&id));
        // A late rollback attempt (from a stale failure path) stays a no-op
        let changed = reduce(
            &mut state,
            Event::DeleteRolledBack {
                snapshot: record("x", 50),
            },
        );
        assert!(!changed);
    }

    #[test]
    fn test_no_duplicate_ids_across_event_interleavings() {
        let mut state = CollectionState::new();
        let draft = Bookmark::draft("owner-1", "https://example.com", "Example");
        let placeholder = draft.id.clone();

        let events = vec![
            Event::LocalInsert(draft),
            Event::RemoteInsert(record("r1", 100)),
            Event::RemoteInsert(record("r1", 100)),
            Event::AddConfirmed {
                placeholder,
                record: record("r1", 100),
            },
            Event::RemoteInsert(record("r2", 200)),
        ];

        for event in events {
            reduce(&mut state, event);

            let mut seen = std::collections::HashSet::new();
            for entry in state.store().entries() {
                assert!(seen.insert(entry.id.clone()), "duplicate id {}", entry.id);
            }
        }
        assert_eq!(ids(&state), vec!["r2", "r1"]);
    }
}
