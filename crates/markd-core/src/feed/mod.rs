//! Realtime feed integration
//!
//! A feed delivers push notifications for rows matching the session's
//! owner: inserts (this session's own mutations echoing back, or other
//! sessions' changes) and deletes. Events arrive over a channel pair
//! ([`FeedHandle`]) produced by a feed adapter such as
//! [`realtime::RealtimeClient`], and are applied in arrival order through
//! the session's reducer.
//!
//! The listener performs no retries and no reorder buffering: every event
//! is idempotent, so duplicate or out-of-order delivery cannot corrupt
//! the collection.

mod protocol;
mod realtime;

pub use protocol::{ClientMessage, ServerMessage};
pub use realtime::{FeedError, RealtimeClient};

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{Bookmark, BookmarkId};
use crate::reconcile::Event;
use crate::session::Shared;

/// A push notification from the feed
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A row was inserted for this owner
    Insert(Bookmark),
    /// A row was deleted for this owner
    Delete(BookmarkId),
}

/// Commands sent to a feed adapter task
#[derive(Debug)]
pub enum FeedCommand {
    /// Unsubscribe and stop the adapter
    Shutdown,
}

/// Channel pair connecting a feed adapter to a session
///
/// Adapters push events into `events`; the session's listener sends
/// `Shutdown` into `commands` when the subscription is released.
pub struct FeedHandle {
    pub events: mpsc::Receiver<FeedEvent>,
    pub commands: mpsc::Sender<FeedCommand>,
}

impl FeedHandle {
    pub fn new(events: mpsc::Receiver<FeedEvent>, commands: mpsc::Sender<FeedCommand>) -> Self {
        Self { events, commands }
    }
}

/// Scoped handle on a running feed subscription
///
/// Created by `Session::attach_feed`. Dropping the listener (however the
/// owning scope exits) signals shutdown to both the listener task and the
/// feed adapter; [`FeedListener::detach`] does the same and additionally
/// waits for the listener task to finish.
pub struct FeedListener {
    commands: mpsc::Sender<FeedCommand>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedListener {
    pub(crate) fn spawn(handle: FeedHandle, shared: Arc<Shared>) -> Self {
        let FeedHandle { events, commands } = handle;
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(listener_task(events, shared, stop_rx));
        Self {
            commands,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Release the subscription and wait for the listener to stop
    pub async fn detach(mut self) {
        let _ = self.commands.send(FeedCommand::Shutdown).await;
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the listener task has stopped (feed closed or detached)
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for FeedListener {
    fn drop(&mut self) {
        let _ = self.commands.try_send(FeedCommand::Shutdown);
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// Apply feed events in arrival order until the feed closes or the
/// listener is released
async fn listener_task(
    mut events: mpsc::Receiver<FeedEvent>,
    shared: Arc<Shared>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stop => {
                debug!("feed listener released");
                break;
            }
            event = events.recv() => match event {
                Some(FeedEvent::Insert(record)) => {
                    debug!(id = %record.id, "feed insert");
                    shared.apply(Event::RemoteInsert(record));
                }
                Some(FeedEvent::Delete(id)) => {
                    debug!(id = %id, "feed delete");
                    shared.apply(Event::RemoteDelete(id));
                }
                None => {
                    debug!("feed channel closed");
                    break;
                }
            }
        }
    }
}
