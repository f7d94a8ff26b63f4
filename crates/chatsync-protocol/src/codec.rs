//! Codec trait, implementations, and the strict frame decoder.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The rest of the protocol layer doesn't care HOW messages are serialized;
//! it just needs something that implements the [`Codec`] trait.
//!
//! On top of the codec sit the two functions the client actually calls:
//! [`encode_intent`] for outbound frames and [`decode_event`] for inbound
//! ones. `decode_event` never guesses: it returns exactly one
//! [`ServerEvent`] or a [`ProtocolError`] that says why the frame was
//! rejected, and the caller pattern-matches on that.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{ClientIntent, ProtocolError, ServerEvent, ServerMessageKind, UnknownKind};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// - `Send + Sync` → safe to share with the connection's event-loop task.
/// - `'static` → the codec owns everything it needs.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// The chat server speaks one JSON document per frame, so this is the
/// codec the client uses. It lives behind the `json` feature flag
/// (enabled by default).
///
/// ## Example
///
/// ```rust
/// use chatsync_protocol::{Codec, JsonCodec, ClientIntent, UserId};
///
/// let codec = JsonCodec;
/// let intent = ClientIntent::Join { user: UserId::new("alice") };
///
/// let bytes = codec.encode(&intent).unwrap();
/// let decoded: ClientIntent = codec.decode(&bytes).unwrap();
/// assert_eq!(intent, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Frame encoding / decoding
// ---------------------------------------------------------------------------

/// Just the discriminant of an inbound frame. Every other field is ignored
/// at this stage, so a frame with an unknown `type` still parses here.
#[derive(Deserialize)]
struct FrameHeader {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Encodes an outbound intent into a single frame.
///
/// A `SendMessage` may carry an empty user: a client that never picked a
/// name still posts, and the server decides what to do with it.
///
/// # Errors
/// - [`ProtocolError::InvalidMessage`] if a `Join` has a blank user id.
/// - Whatever the codec returns if serialization fails.
pub fn encode_intent<C: Codec>(
    codec: &C,
    intent: &ClientIntent,
) -> Result<Vec<u8>, ProtocolError> {
    if matches!(intent, ClientIntent::Join { user } if user.as_str().trim().is_empty()) {
        return Err(ProtocolError::InvalidMessage(format!(
            "{} intent has a blank user id",
            intent.kind()
        )));
    }
    codec.encode(intent)
}

/// Strictly decodes one inbound frame.
///
/// The checks run in order, and the first failure wins:
///
/// 1. the payload parses at all (else `Decode`)
/// 2. it carries a `type` (else `MissingKind`)
/// 3. the `type` is a known [`ServerMessageKind`] (else `UnknownKind`)
/// 4. the remaining fields match that kind's shape (else `Decode`)
///
/// Splitting step 3 from step 4 lets callers tell "the server speaks a
/// newer dialect" apart from "the server sent garbage".
pub fn decode_event<C: Codec>(codec: &C, data: &[u8]) -> Result<ServerEvent, ProtocolError> {
    let header: FrameHeader = codec.decode(data)?;
    let kind = header.kind.ok_or(ProtocolError::MissingKind)?;
    kind.parse::<ServerMessageKind>()
        .map_err(|UnknownKind(kind)| ProtocolError::UnknownKind(kind))?;
    codec.decode(data)
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ChatMessage, UserId};

    #[test]
    fn test_decode_event_chat_message_returns_event() {
        let frame = br#"{"type":"ChatMessage","id":"m1","channel_id":"c1","sender":"bob","created":1000,"content":"hello"}"#;
        let event = decode_event(&JsonCodec, frame).expect("should decode");
        match event {
            ServerEvent::ChatMessage(ChatMessage { id, content, .. }) => {
                assert_eq!(id.as_str(), "m1");
                assert_eq!(content, "hello");
            }
            other => panic!("expected ChatMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_event_invalid_command_returns_event() {
        let event = decode_event(&JsonCodec, br#"{"type":"InvalidCommand"}"#)
            .expect("should decode");
        assert_eq!(event, ServerEvent::InvalidCommand);
    }

    #[test]
    fn test_decode_event_malformed_json_returns_decode_error() {
        let result = decode_event(&JsonCodec, b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_event_without_type_returns_missing_kind() {
        let result = decode_event(&JsonCodec, br#"{"id":"m1"}"#);
        assert!(matches!(result, Err(ProtocolError::MissingKind)));
    }

    #[test]
    fn test_decode_event_unknown_type_returns_unknown_kind() {
        let result = decode_event(&JsonCodec, br#"{"type":"Typing","user":"bob"}"#);
        assert!(
            matches!(&result, Err(ProtocolError::UnknownKind(k)) if k == "Typing"),
            "got {result:?}"
        );
    }

    #[test]
    fn test_decode_event_known_type_with_bad_shape_returns_decode_error() {
        // `created` must be a number of milliseconds.
        let frame = br#"{"type":"ChatMessage","id":"m1","channel_id":"c1","sender":"bob","created":"yesterday","content":"x"}"#;
        let result = decode_event(&JsonCodec, frame);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_event_json_array_returns_decode_error() {
        let result = decode_event(&JsonCodec, b"[1,2,3]");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_intent_produces_wire_shape() {
        let intent = ClientIntent::SendMessage {
            user: UserId::new("alice"),
            content: "hi".into(),
        };
        let bytes = encode_intent(&JsonCodec, &intent).expect("should encode");
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "SendMessage", "user": "alice", "content": "hi"})
        );
    }

    #[test]
    fn test_encode_intent_join_blank_user_returns_invalid_message() {
        let intent = ClientIntent::Join {
            user: UserId::new("  "),
        };
        let result = encode_intent(&JsonCodec, &intent);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_encode_intent_send_message_empty_user_is_encoded() {
        let intent = ClientIntent::SendMessage {
            user: UserId::default(),
            content: "hi".into(),
        };
        let bytes = encode_intent(&JsonCodec, &intent).expect("should encode");
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "SendMessage", "user": "", "content": "hi"})
        );
    }
}
