//! Wire protocol for chatsync.
//!
//! This crate defines the "language" that the chat client and the chat
//! server speak:
//!
//! - **Types** ([`ClientIntent`], [`ServerEvent`], [`ChatMessage`], the
//!   identifier newtypes): the shapes that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those shapes are
//!   converted to/from bytes, plus the strict frame decoder
//!   ([`decode_event`]).
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw frames) and the
//! store (channel state). It doesn't know about sockets or reducers;
//! it only knows how to serialize and validate messages.
//!
//! ```text
//! Transport (frames) → Protocol (ServerEvent) → Store (ChannelState)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{decode_event, encode_intent, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ChannelId, ChatMessage, ClientIntent, ClientMessageKind, MessageId,
    ServerEvent, ServerMessageKind, UnknownKind, UserId,
};
