//! Session: optimistic mutations against the owner's collection
//!
//! A [`Session`] is the entry point for a UI collaborator. It seeds the
//! in-memory collection from the storage service, exposes the ordered
//! snapshot for rendering, and drives the per-mutation lifecycle:
//! optimistic apply, remote call, then confirm or roll back. Feed events
//! attach through [`Session::attach_feed`] and flow through the same
//! reducer, so both paths share one merge law.
//!
//! All state transitions are synchronous and applied under one lock in
//! dispatch order; the only suspension points are the remote calls
//! themselves.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::feed::{FeedHandle, FeedListener};
use crate::models::{Bookmark, BookmarkId, PendingMutation};
use crate::reconcile::{reduce, CollectionState, Event};
use crate::remote::{RemoteError, RemoteStore};

/// Errors surfaced by mutation submissions
#[derive(Error, Debug)]
pub enum MutationError {
    /// Rejected before any optimistic mutation; no state change
    #[error("invalid bookmark: {0}")]
    Validation(String),

    /// The remote call failed; the optimistic change was rolled back
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// State shared between the session and its feed listener
pub(crate) struct Shared {
    state: Mutex<CollectionState>,
    changes: watch::Sender<u64>,
}

impl Shared {
    pub(crate) fn new(state: CollectionState) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: Mutex::new(state),
            changes,
        }
    }

    /// Apply one event under the lock, in dispatch order
    pub(crate) fn apply(&self, event: Event) {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            reduce(&mut state, event)
        };
        if changed {
            self.changes.send_modify(|revision| *revision += 1);
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Bookmark> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    fn get(&self, id: &BookmarkId) -> Option<Bookmark> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .store()
            .get(id)
            .cloned()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

/// A connected view of one owner's bookmark collection
pub struct Session<S> {
    owner: String,
    remote: S,
    shared: Arc<Shared>,
}

impl<S: RemoteStore> Session<S> {
    /// Connect a session, seeding the collection from the storage service
    pub async fn connect(owner: impl Into<String>, remote: S) -> Result<Self, RemoteError> {
        let owner = owner.into();
        let records = remote.list_by_owner(&owner).await?;
        info!(owner = %owner, count = records.len(), "session seeded");
        Ok(Self::seeded(owner, remote, records))
    }

    /// Build a session from an already-fetched listing
    pub fn seeded(
        owner: impl Into<String>,
        remote: S,
        records: impl IntoIterator<Item = Bookmark>,
    ) -> Self {
        Self {
            owner: owner.into(),
            remote,
            shared: Arc::new(Shared::new(CollectionState::seeded(records))),
        }
    }

    /// The owner this session is scoped to
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Ordered snapshot of the visible collection
    pub fn collection(&self) -> Vec<Bookmark> {
        self.shared.snapshot()
    }

    /// Subscribe to change notifications
    ///
    /// The value is a revision counter bumped each time the visible
    /// collection changes; receivers re-read [`Session::collection`].
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.shared.subscribe()
    }

    /// Attach a realtime feed to this session
    ///
    /// Events are applied in arrival order through the session's reducer.
    /// The returned listener releases the subscription on drop or via
    /// [`FeedListener::detach`].
    pub fn attach_feed(&self, handle: FeedHandle) -> FeedListener {
        FeedListener::spawn(handle, self.shared.clone())
    }

    /// Submit a new bookmark
    ///
    /// The draft is visible under its placeholder id from the moment of
    /// submission. On success the placeholder gives way to the
    /// authoritative record, which is returned; on failure the draft is
    /// withdrawn and the error surfaced.
    pub async fn submit_add(&self, url: &str, title: &str) -> Result<Bookmark, MutationError> {
        let (url, title) = validate_submission(url, title)?;

        let draft = Bookmark::draft(&self.owner, &url, &title);
        let placeholder = draft.id.clone();
        let mut mutation = PendingMutation::add(draft.clone());

        self.shared.apply(Event::LocalInsert(draft));
        debug!(id = %placeholder, "optimistic add applied");

        match self.remote.create(&self.owner, &url, &title).await {
            Ok(record) => {
                mutation.confirm();
                info!(id = %record.id, "add confirmed");
                self.shared.apply(Event::AddConfirmed {
                    placeholder,
                    record: record.clone(),
                });
                Ok(record)
            }
            Err(err) => {
                mutation.roll_back();
                warn!(id = %placeholder, %err, "add failed, rolling back");
                self.shared.apply(Event::AddRolledBack { placeholder });
                Err(err.into())
            }
        }
    }

    /// Delete a bookmark
    ///
    /// The entry disappears from the moment of submission. On failure it
    /// is restored from the retained snapshot, unless a remote authority
    /// confirmed the id absent in the interim.
    pub async fn submit_delete(&self, id: &BookmarkId) -> Result<(), MutationError> {
        let server_id = id.as_confirmed().ok_or_else(|| {
            MutationError::Validation("bookmark is not confirmed yet".to_string())
        })?;

        let Some(snapshot) = self.shared.get(id) else {
            // Already gone; removing an absent id is not an error.
            return Ok(());
        };
        let mut mutation = PendingMutation::delete(snapshot.clone());

        self.shared.apply(Event::LocalRemove(id.clone()));
        debug!(id = %id, "optimistic delete applied");

        match self.remote.delete(&self.owner, server_id).await {
            Ok(()) => {
                mutation.confirm();
                info!(id = %id, "delete confirmed");
                self.shared.apply(Event::DeleteConfirmed { id: id.clone() });
                Ok(())
            }
            Err(err) => {
                mutation.roll_back();
                warn!(id = %id, %err, "delete failed, rolling back");
                self.shared.apply(Event::DeleteRolledBack { snapshot });
                Err(err.into())
            }
        }
    }
}

/// Validate and normalize a submission before any optimistic mutation.
///
/// URLs without a scheme get `https://` prepended; only http and https
/// pass. An empty title defaults to the URL's hostname without a leading
/// `www.`.
fn validate_submission(url: &str, title: &str) -> Result<(String, String), MutationError> {
    let raw = url.trim();
    if raw.is_empty() {
        return Err(MutationError::Validation("url must not be empty".to_string()));
    }

    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let parsed = Url::parse(&candidate)
        .map_err(|_| MutationError::Validation(format!("not a valid URL: {}", raw)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MutationError::Validation(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    let title = title.trim();
    let title = if title.is_empty() {
        parsed
            .host_str()
            .map(|host| host.trim_start_matches("www.").to_string())
            .ok_or_else(|| MutationError::Validation("URL has no host".to_string()))?
    } else {
        title.to_string()
    };

    Ok((candidate, title))
}
