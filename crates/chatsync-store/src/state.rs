//! State and action types: what the store holds and what can change it.

use chatsync_protocol::{ChannelId, ChatMessage, UserId};

/// Channel name shown before the server tells us anything better.
pub const DEFAULT_CHANNEL_NAME: &str = "#Channel 1";

// ---------------------------------------------------------------------------
// ChannelState
// ---------------------------------------------------------------------------

/// Everything the client knows about its channel.
///
/// Only the [`ChannelStore`](crate::ChannelStore) mutates this, and only
/// through [`reduce`](crate::reduce). Everyone else sees clones or a
/// borrowed snapshot from a watch receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    /// The label this client posts under. `None` until the user picks one.
    pub local_user: Option<UserId>,

    /// The channel the log belongs to. `None` until the first message
    /// arrives, after which it never changes.
    pub channel_id: Option<ChannelId>,

    /// Human-readable channel name.
    pub channel_name: String,

    /// Messages in the order they were received (not sorted by time).
    pub messages: Vec<ChatMessage>,
}

impl ChannelState {
    /// Creates an empty state for a channel with the given display name.
    pub fn with_name(channel_name: impl Into<String>) -> Self {
        Self {
            local_user: None,
            channel_id: None,
            channel_name: channel_name.into(),
            messages: Vec::new(),
        }
    }

    /// Returns `true` if `message` belongs to a different channel than the
    /// one already adopted. Always `false` before adoption.
    pub fn is_foreign(&self, message: &ChatMessage) -> bool {
        self.channel_id
            .as_ref()
            .is_some_and(|adopted| *adopted != message.channel_id)
    }

    /// The message log sorted by `(created_at, id)`.
    ///
    /// The log itself stays in arrival order; this returns a sorted view.
    pub fn chronological(&self) -> Vec<&ChatMessage> {
        let mut sorted: Vec<&ChatMessage> = self.messages.iter().collect();
        sorted.sort_by(|a, b| a.cmp_chronological(b));
        sorted
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::with_name(DEFAULT_CHANNEL_NAME)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A typed event the reducer knows how to apply.
///
/// Actions come from two places: the session façade (user intent) and the
/// connection manager (server events).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    /// The local user picked a new label.
    ChangeUser(UserId),

    /// The server delivered a message for the channel.
    AppendMessage(ChatMessage),

    /// The local user asked to send a message.
    ///
    /// Reserved for optimistic local echo; it currently changes nothing,
    /// because messages only show up once the server echoes them back.
    SendMessageRequested(UserId, String),
}
