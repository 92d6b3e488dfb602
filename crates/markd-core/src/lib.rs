//! Markd Core Library
//!
//! This crate provides the core functionality for Markd, a private
//! bookmark collection kept consistent across concurrently-connected
//! sessions.
//!
//! # Architecture
//!
//! A [`Session`] seeds an in-memory collection from the storage service
//! and applies every change, local or remote, through one reconciliation
//! reducer:
//!
//! - Local edits are applied optimistically, then confirmed or rolled
//!   back when the storage call completes.
//! - Feed events (this session's own echoes, or other sessions' changes)
//!   flow through the same reducer, so both paths share one merge law:
//!   a record is visible exactly when its id has been inserted and not
//!   subsequently removed.
//!
//! # Quick Start
//!
//! ```text
//! let store = RestStore::new("https://api.example.com")?;
//! let session = Session::connect("owner-1", store).await?;
//!
//! // Add a bookmark (visible immediately, confirmed asynchronously)
//! let record = session.submit_add("https://example.com", "Example").await?;
//!
//! // Follow other sessions' changes
//! let feed = RealtimeClient::new("wss://feed.example.com");
//! let listener = session.attach_feed(feed.subscribe("owner-1").await?);
//! ```
//!
//! # Modules
//!
//! - `session`: mutation coordinator and session surface (main entry point)
//! - `models`: bookmark records, tagged identities, pending mutations
//! - `store`: in-memory ordered collection
//! - `reconcile`: the merge law applied to every collection transition
//! - `feed`: realtime feed listener, wire protocol, and WebSocket client
//! - `remote`: storage service contract and HTTP client
//! - `config`: application configuration

pub mod config;
pub mod feed;
pub mod models;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod store;

pub use config::{Config, ConfigError};
pub use feed::{FeedEvent, FeedHandle, FeedListener, RealtimeClient};
pub use models::{Bookmark, BookmarkId, MutationKind, MutationPhase, PendingMutation};
pub use reconcile::{CollectionState, Event};
pub use remote::{RemoteError, RemoteStore, RestStore};
pub use session::{MutationError, Session};
pub use store::{EntryStore, StoreError};
