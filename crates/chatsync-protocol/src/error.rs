//! Error types for the protocol layer.
//!
//! Each crate in chatsync defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in serialization or frame
//! validation, not in networking or state handling.

/// Errors that can occur in the protocol layer.
///
/// Decoding an inbound frame is strict: a frame either becomes exactly one
/// [`ServerEvent`](crate::ServerEvent) or fails with one of these variants.
/// The variants are ordered by how far the decoder got before giving up.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, or a known `type` whose
    /// fields have the wrong shape (missing `id`, `created` not a number...).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is a valid document but carries no `type` discriminant.
    #[error("frame has no `type` discriminant")]
    MissingKind,

    /// The `type` discriminant is not one this client understands.
    ///
    /// This is a compatibility signal (a newer server, a typo), not a
    /// fatal error. The receiver logs it and moves on.
    #[error("unknown message type `{0}`")]
    UnknownKind(String),

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
