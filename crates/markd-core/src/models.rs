//! Data models for Markd
//!
//! Defines the core data structures: Bookmark, BookmarkId, and
//! PendingMutation. Bookmarks round-trip through serde in the wire format
//! used by the storage service (`id` as a plain string, `created_at` as
//! RFC 3339).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Prefix for placeholder ids.
///
/// Storage-issued ids never carry this prefix, so a placeholder can never
/// collide with a confirmed id.
const PLACEHOLDER_PREFIX: &str = "local-";

/// Identity of a bookmark record.
///
/// An optimistically-created bookmark starts out under a client-generated
/// `Placeholder` id and is superseded by a storage-issued `Confirmed` id
/// once the create call succeeds. Keeping the two cases as distinct
/// variants means the confirmation path can never be confused with a
/// remote echo carrying the authoritative id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookmarkId {
    /// Client-generated id for a not-yet-confirmed bookmark
    Placeholder(Uuid),
    /// Storage-issued id
    Confirmed(String),
}

impl BookmarkId {
    /// Generate a fresh placeholder id
    pub fn placeholder() -> Self {
        BookmarkId::Placeholder(Uuid::new_v4())
    }

    /// Wrap a storage-issued id
    pub fn confirmed(id: impl Into<String>) -> Self {
        BookmarkId::Confirmed(id.into())
    }

    /// Whether this id is a client-generated placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(self, BookmarkId::Placeholder(_))
    }

    /// The storage-issued id, if confirmed
    pub fn as_confirmed(&self) -> Option<&str> {
        match self {
            BookmarkId::Confirmed(id) => Some(id),
            BookmarkId::Placeholder(_) => None,
        }
    }

    /// Parse an id from its string form
    ///
    /// Strings carrying the placeholder prefix and a valid UUID are
    /// placeholders; everything else is a confirmed id.
    pub fn parse(s: &str) -> Self {
        match s
            .strip_prefix(PLACEHOLDER_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
        {
            Some(uuid) => BookmarkId::Placeholder(uuid),
            None => BookmarkId::Confirmed(s.to_string()),
        }
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkId::Placeholder(uuid) => write!(f, "{}{}", PLACEHOLDER_PREFIX, uuid),
            BookmarkId::Confirmed(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for BookmarkId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for BookmarkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BookmarkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// A saved link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    /// Unique identifier (placeholder until confirmed)
    pub id: BookmarkId,
    /// Owner of the bookmark
    pub owner: String,
    /// The URL
    pub url: String,
    /// Display title
    pub title: String,
    /// When this bookmark was created
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Create a draft bookmark under a fresh placeholder id
    ///
    /// The draft is what becomes visible the moment an add is submitted,
    /// before the storage service has confirmed it.
    pub fn draft(
        owner: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: BookmarkId::placeholder(),
            owner: owner.into(),
            url: url.into(),
            title: title.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a bookmark with a storage-issued id
    pub fn confirmed(
        id: impl Into<String>,
        owner: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookmarkId::confirmed(id),
            owner: owner.into(),
            url: url.into(),
            title: title.into(),
            created_at,
        }
    }
}

/// Lifecycle phase of an in-flight mutation
///
/// `Confirmed` and `RolledBack` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Applied locally, remote confirmation pending
    Optimistic,
    /// Remote call succeeded
    Confirmed,
    /// Remote call failed, local change reverted
    RolledBack,
}

/// What an in-flight mutation is doing
#[derive(Debug, Clone)]
pub enum MutationKind {
    /// An optimistic add: the draft is visible under its placeholder id
    Add {
        /// Placeholder identity of the draft
        local_id: BookmarkId,
        /// The record as applied optimistically
        draft: Bookmark,
    },
    /// An optimistic delete: the snapshot is retained for rollback
    Delete {
        /// Identity of the removed record
        target_id: BookmarkId,
        /// The full record removed, for reinsertion on rollback
        snapshot: Bookmark,
    },
}

/// An in-flight optimistic operation
///
/// Constructed at the moment the optimistic transition is applied, then
/// driven to exactly one of its terminal phases by the remote outcome.
#[derive(Debug, Clone)]
pub struct PendingMutation {
    kind: MutationKind,
    phase: MutationPhase,
}

impl PendingMutation {
    /// Start an add mutation for a draft record
    pub fn add(draft: Bookmark) -> Self {
        Self {
            kind: MutationKind::Add {
                local_id: draft.id.clone(),
                draft,
            },
            phase: MutationPhase::Optimistic,
        }
    }

    /// Start a delete mutation, retaining the removed record
    pub fn delete(snapshot: Bookmark) -> Self {
        Self {
            kind: MutationKind::Delete {
                target_id: snapshot.id.clone(),
                snapshot,
            },
            phase: MutationPhase::Optimistic,
        }
    }

    /// The operation this mutation performs
    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Mark the mutation confirmed by the storage service
    pub fn confirm(&mut self) {
        debug_assert_eq!(self.phase, MutationPhase::Optimistic);
        self.phase = MutationPhase::Confirmed;
    }

    /// Mark the mutation rolled back after a failed remote call
    pub fn roll_back(&mut self) {
        debug_assert_eq!(self.phase, MutationPhase::Optimistic);
        self.phase = MutationPhase::RolledBack;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_id_is_namespaced() {
        let id = BookmarkId::placeholder();
        assert!(id.is_placeholder());
        assert!(id.to_string().starts_with(PLACEHOLDER_PREFIX));
        assert!(id.as_confirmed().is_none());
    }

    #[test]
    fn test_placeholder_ids_are_unique() {
        let a = BookmarkId::placeholder();
        let b = BookmarkId::placeholder();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_parse_round_trip() {
        let placeholder = BookmarkId::placeholder();
        assert_eq!(BookmarkId::parse(&placeholder.to_string()), placeholder);

        let confirmed = BookmarkId::confirmed("r1");
        assert_eq!(BookmarkId::parse(&confirmed.to_string()), confirmed);
    }

    #[test]
    fn test_id_parse_bad_prefix_is_confirmed() {
        // "local-" followed by something that isn't a UUID is just an
        // ordinary (if odd) confirmed id
        let id = BookmarkId::parse("local-not-a-uuid");
        assert!(!id.is_placeholder());
    }

    #[test]
    fn test_draft_has_placeholder_id() {
        let draft = Bookmark::draft("owner-1", "https://example.com", "Example");
        assert!(draft.id.is_placeholder());
        assert_eq!(draft.owner, "owner-1");
        assert_eq!(draft.url, "https://example.com");
        assert_eq!(draft.title, "Example");
    }

    #[test]
    fn test_bookmark_serialization() {
        let bookmark = Bookmark::confirmed(
            "r1",
            "owner-1",
            "https://example.com",
            "Example",
            Utc::now(),
        );
        let json = serde_json::to_string(&bookmark).unwrap();
        let deserialized: Bookmark = serde_json::from_str(&json).unwrap();
        assert_eq!(bookmark, deserialized);
    }

    #[test]
    fn test_bookmark_id_serializes_as_string() {
        let bookmark = Bookmark::confirmed("r1", "o", "https://e.com", "E", Utc::now());
        let value = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(value["id"], serde_json::json!("r1"));
    }

    #[test]
    fn test_pending_add_phases() {
        let draft = Bookmark::draft("o", "https://e.com", "E");
        let mut mutation = PendingMutation::add(draft.clone());
        assert_eq!(mutation.phase(), MutationPhase::Optimistic);

        match mutation.kind() {
            MutationKind::Add { local_id, .. } => assert_eq!(*local_id, draft.id),
            _ => panic!("expected add mutation"),
        }

        mutation.confirm();
        assert_eq!(mutation.phase(), MutationPhase::Confirmed);
    }

    #[test]
    fn test_pending_delete_retains_snapshot() {
        let record = Bookmark::confirmed("r1", "o", "https://e.com", "E", Utc::now());
        let mut mutation = PendingMutation::delete(record.clone());

        match mutation.kind() {
            MutationKind::Delete { snapshot, .. } => assert_eq!(*snapshot, record),
            _ => panic!("expected delete mutation"),
        }

        mutation.roll_back();
        assert_eq!(mutation.phase(), MutationPhase::RolledBack);
    }
}
