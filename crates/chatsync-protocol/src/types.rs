//! Core protocol types for chatsync's wire format.
//!
//! This module defines every type that travels "on the wire": the
//! structures that get serialized to JSON, sent over the socket, and
//! deserialized on the other side. Outbound shapes are [`ClientIntent`]s,
//! inbound shapes are [`ServerEvent`]s.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Declares a string-backed identifier newtype.
///
/// All three identifiers are opaque strings that only need to be unique in
/// their own namespace. Wrapping them separately means a `ChannelId` can
/// never be passed where a `UserId` is expected, even though both are
/// `String` underneath. `#[serde(transparent)]` keeps the JSON a plain
/// string: `UserId("alice")` is just `"alice"` on the wire.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw string without validating it.
            ///
            /// Use this for values that already came from a trusted
            /// source (the server, a test fixture).
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parses user-supplied input: trims surrounding whitespace
            /// and returns `None` if nothing is left.
            pub fn parse(input: &str) -> Option<Self> {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_owned()))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// A free-text label identifying a chat user. There is no
    /// authentication: the client picks its own.
    UserId
);

string_id!(
    /// Identifies a channel. The client never chooses one; it adopts the
    /// id carried by the first message it receives.
    ChannelId
);

string_id!(
    /// Identifies a single chat message. Assigned by the server.
    MessageId
);

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// One message in a channel's log.
///
/// Messages are immutable once created: the server stamps `id` and
/// `created_at`, and the client only ever stores and displays them.
///
/// The wire names differ from the Rust names for one field:
/// `created_at` travels as `created`, in milliseconds since the Unix epoch
/// (`chrono::serde::ts_milliseconds`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub sender: UserId,
    #[serde(rename = "created", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub content: String,
}

impl ChatMessage {
    /// The key messages are ordered by: creation time, then id as a
    /// tie-break for messages stamped in the same millisecond.
    pub fn ordering_key(&self) -> (DateTime<Utc>, &MessageId) {
        (self.created_at, &self.id)
    }

    /// Compares two messages by [`ordering_key`](Self::ordering_key).
    ///
    /// Handy with `sort_by`: `messages.sort_by(ChatMessage::cmp_chronological)`.
    pub fn cmp_chronological(&self, other: &Self) -> Ordering {
        self.ordering_key().cmp(&other.ordering_key())
    }
}

// ---------------------------------------------------------------------------
// Discriminants
// ---------------------------------------------------------------------------

/// Returned when a string is not a known message discriminant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message kind `{0}`")]
pub struct UnknownKind(pub String);

/// The `type` values a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMessageKind {
    Join,
    SendMessage,
}

impl ClientMessageKind {
    /// The exact string used in the `type` field on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Join => "Join",
            Self::SendMessage => "SendMessage",
        }
    }
}

impl fmt::Display for ClientMessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientMessageKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Join" => Ok(Self::Join),
            "SendMessage" => Ok(Self::SendMessage),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

/// The `type` values a server may send. Anything else is discarded by the
/// client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerMessageKind {
    ChatMessage,
    InvalidCommand,
}

impl ServerMessageKind {
    /// The exact string used in the `type` field on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatMessage => "ChatMessage",
            Self::InvalidCommand => "InvalidCommand",
        }
    }
}

impl fmt::Display for ServerMessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerMessageKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ChatMessage" => Ok(Self::ChatMessage),
            "InvalidCommand" => Ok(Self::InvalidCommand),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientIntent: client → server
// ---------------------------------------------------------------------------

/// A request the client sends to the server.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "SendMessage", "user": "alice", "content": "hi" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientIntent {
    /// "I am `user` and I'd like to be in this channel."
    Join { user: UserId },

    /// "Post `content` to the channel as `user`."
    SendMessage { user: UserId, content: String },
}

impl ClientIntent {
    /// Returns the discriminant this intent is tagged with on the wire.
    pub fn kind(&self) -> ClientMessageKind {
        match self {
            Self::Join { .. } => ClientMessageKind::Join,
            Self::SendMessage { .. } => ClientMessageKind::SendMessage,
        }
    }

    /// The user the intent is sent on behalf of.
    pub fn user(&self) -> &UserId {
        match self {
            Self::Join { user } | Self::SendMessage { user, .. } => user,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent: server → client
// ---------------------------------------------------------------------------

/// A notification the server pushes to the client.
///
/// The chat message variant flattens the message fields next to `type`:
///   `{ "type": "ChatMessage", "id": "m1", "channel_id": "c1", ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A message was posted to the channel (possibly our own, echoed back).
    ChatMessage(ChatMessage),

    /// The server rejected the last command it received.
    InvalidCommand,
}

impl ServerEvent {
    /// Returns the discriminant this event is tagged with on the wire.
    pub fn kind(&self) -> ServerMessageKind {
        match self {
            Self::ChatMessage(_) => ServerMessageKind::ChatMessage,
            Self::InvalidCommand => ServerMessageKind::InvalidCommand,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
