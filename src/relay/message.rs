//! Wire types for the relay.
//!
//! Defines the outbound payloads pushed to clients and the decoding
//! rules for frames received from them.
//!
//! Inbound `text` is read as JSON: a string is relayed as-is, a number or
//! boolean as its JSON spelling (`true`, `1.5`), and `null`, arrays and
//! objects are dropped rather than stringified. There is no notion of a
//! "None" or "True" message on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notice text for a new connection.
pub const JOINED_TEXT: &str = "Someone joined the chat.";

/// Notice text for a clean close.
pub const LEFT_TEXT: &str = "Someone left the chat.";

/// Notice text for a connection that ended abnormally.
pub const LOST_TEXT: &str = "A connection was lost.";

/// A payload pushed to every member of the room.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"system","text":"Someone joined the chat.","online":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    /// Membership change notice.
    System { text: &'static str, online: usize },

    /// A relayed user message. Carries no sender identity.
    Message { text: String },
}

impl Outbound {
    pub fn joined(online: usize) -> Self {
        Self::System {
            text: JOINED_TEXT,
            online,
        }
    }

    pub fn left(online: usize) -> Self {
        Self::System {
            text: LEFT_TEXT,
            online,
        }
    }

    pub fn lost(online: usize) -> Self {
        Self::System {
            text: LOST_TEXT,
            online,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    /// Serializes to the JSON text frame sent over the wire.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Raw inbound frame. Only `text` is inspected; `type` and any other
/// fields are ignored.
#[derive(Debug, Deserialize)]
struct Inbound {
    #[serde(default)]
    text: Option<Value>,
}

/// Decodes a client text frame into the text to relay.
///
/// Returns `None` for frames that are not JSON objects, frames without a
/// usable `text`, and frames whose text is empty after trimming.
pub fn decode_inbound(frame: &str) -> Option<String> {
    let inbound: Inbound = serde_json::from_str(frame).ok()?;

    let text = match inbound.text? {
        Value::String(s) => s,
        v @ (Value::Number(_) | Value::Bool(_)) => v.to_string(),
        _ => return None,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_owned())
}
