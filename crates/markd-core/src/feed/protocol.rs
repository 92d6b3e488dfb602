//! Feed protocol message types
//!
//! JSON messages exchanged with the realtime feed service over WebSocket.
//! The feed is owner-scoped: a client subscribes for one owner and then
//! receives insert/delete notifications for that owner's rows until it
//! unsubscribes or the connection closes.

use serde::{Deserialize, Serialize};

use crate::models::Bookmark;

/// Messages sent to the feed service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to changes for an owner's rows
    Subscribe { owner: String },
    /// Unsubscribe before closing
    Unsubscribe { owner: String },
}

/// Messages received from the feed service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription acknowledged
    Subscribed { owner: String },
    /// A row was inserted
    Inserted { record: Bookmark },
    /// A row was deleted
    Deleted { id: String },
    /// Keepalive
    Heartbeat,
    /// Error from the feed service
    Error { message: String },
}

impl ClientMessage {
    /// Create a subscribe message
    pub fn subscribe(owner: &str) -> Self {
        ClientMessage::Subscribe {
            owner: owner.to_string(),
        }
    }

    /// Create an unsubscribe message
    pub fn unsubscribe(owner: &str) -> Self {
        ClientMessage::Unsubscribe {
            owner: owner.to_string(),
        }
    }

    /// Encode message to JSON text
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("JSON encoding failed")
    }
}

impl ServerMessage {
    /// Decode message from JSON text
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode message to JSON text
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("JSON encoding failed")
    }
}
