//! Unified error type for the chatsync client.

use chatsync_protocol::ProtocolError;
use chatsync_transport::TransportError;

use crate::ConnectionState;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `chatsync` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
///
/// None of these are fatal: the worst outcome of any of them is "message
/// not sent" or "frame ignored".
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// `open` was called on a manager that already made its one attempt.
    #[error("connection manager already started")]
    AlreadyStarted,

    /// The connection isn't open, so nothing can be sent.
    #[error("connection is not open (state: {0:?})")]
    NotOpen(ConnectionState),

    /// The manager has been disposed.
    #[error("connection manager disposed")]
    Disposed,
}
