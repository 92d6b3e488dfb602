//! Authoritative storage contract
//!
//! The storage service owns the durable table of bookmark rows, filtered
//! by owner. The engine only requires the three operations below; the
//! session drives them and reconciles their outcomes against the
//! in-memory collection. [`rest::RestStore`] is the HTTP implementation.

mod rest;

pub use rest::RestStore;

use thiserror::Error;

use crate::models::Bookmark;

/// Errors from the storage service
///
/// All of these are recoverable: a failed create or delete rolls back the
/// optimistic change and leaves the collection consistent.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request never completed (connection, timeout, DNS)
    #[error("request to storage service failed: {0}")]
    Transport(String),

    /// The service answered with a failure status
    #[error("storage service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// The response body was not in the expected shape
    #[error("unexpected response from storage service: {0}")]
    Decode(String),
}

/// Operations required from the authoritative storage service
///
/// `create` issues the authoritative id and timestamp; `delete` is scoped
/// to `(owner, id)` so a caller can never remove rows it does not own;
/// `list_by_owner` returns rows sorted by `created_at` descending and is
/// used once per session to seed the collection.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Create a bookmark row, returning the authoritative record
    async fn create(&self, owner: &str, url: &str, title: &str) -> Result<Bookmark, RemoteError>;

    /// Delete the row with this id, scoped to the owner
    async fn delete(&self, owner: &str, id: &str) -> Result<(), RemoteError>;

    /// List all rows for an owner, newest first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Bookmark>, RemoteError>;
}
