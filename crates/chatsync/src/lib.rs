//! # chatsync
//!
//! Client-side chat session core.
//!
//! chatsync keeps one channel's conversation in sync with a chat server
//! over a WebSocket and exposes it to whatever renders it. The pieces:
//!
//! - [`ConnectionManager`]: the one connection, its lifecycle, and the
//!   frames that cross it
//! - [`FrameRouter`]: strict decoding of inbound frames into store updates
//! - [`ChatSession`]: the façade a UI calls (`submit_message`,
//!   `set_local_user`)
//! - [`ChatClient`]: wires all of the above to a [`ChannelStore`]
//!
//! ```text
//! UI ──→ ChatSession ──┬──→ ChannelStore ──→ subscribers (UI)
//!                      └──→ ConnectionManager ──→ server
//! server ──→ ConnectionManager ──→ FrameRouter ──→ ChannelStore
//! ```

mod client;
mod config;
mod error;
mod manager;
mod router;
mod session;

pub use client::{ChatClient, ChatClientBuilder};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::ClientError;
pub use manager::{ConnectionManager, ConnectionState, IntentSink};
pub use router::{EventConsumer, FrameRouter, RouteOutcome};
pub use session::ChatSession;

pub use chatsync_protocol::{ChannelId, ChatMessage, ClientIntent, MessageId, ServerEvent, UserId};
pub use chatsync_store::{Action, ChannelState, ChannelStore, StoreSubscription};

/// Everything a typical application needs.
pub mod prelude {
    pub use crate::{
        ChannelState, ChatClient, ChatClientBuilder, ChatMessage, ChatSession, ClientConfig,
        ClientError, ConnectionState, StoreSubscription, UserId,
    };
}
