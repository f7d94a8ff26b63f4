//! Inbound frame routing: raw bytes in, at most one store update out.
//!
//! The connection manager hands every frame it receives to a
//! [`FrameRouter`]. The router decodes the frame strictly and decides what
//! happens to it:
//!
//! | Frame                      | Outcome                        |
//! |----------------------------|--------------------------------|
//! | `ChatMessage`              | forwarded to the consumer      |
//! | `InvalidCommand`           | logged, no state change        |
//! | unknown `type`             | logged, discarded              |
//! | malformed / wrong shape    | logged, discarded              |
//!
//! Routing never fails and never panics; the outcome is returned only so
//! callers and tests can see what happened.

use std::sync::Arc;

use chatsync_protocol::{decode_event, ChatMessage, Codec, JsonCodec, ProtocolError, ServerEvent};
use chatsync_store::{Action, ChannelStore};

/// Receives the chat messages the router extracts from inbound frames.
pub trait EventConsumer: Send + Sync + 'static {
    /// Called once per valid `ChatMessage` frame, in delivery order.
    fn on_chat_message(&self, message: ChatMessage);
}

/// The store consumes chat messages by appending them to the log.
impl EventConsumer for ChannelStore {
    fn on_chat_message(&self, message: ChatMessage) {
        self.dispatch(Action::AppendMessage(message));
    }
}

/// What the router did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A chat message was handed to the consumer.
    Delivered,
    /// The server sent `InvalidCommand`; nothing was dispatched.
    Rejected,
    /// The frame was malformed or of an unknown kind and was dropped.
    Discarded,
}

/// Decodes inbound frames and forwards chat messages to a consumer.
pub struct FrameRouter<C: Codec = JsonCodec> {
    codec: C,
    consumer: Arc<dyn EventConsumer>,
}

impl FrameRouter<JsonCodec> {
    /// Creates a JSON router that forwards to `consumer`.
    pub fn new(consumer: Arc<dyn EventConsumer>) -> Self {
        Self::with_codec(JsonCodec, consumer)
    }
}

impl<C: Codec> FrameRouter<C> {
    /// Creates a router using a specific codec.
    pub fn with_codec(codec: C, consumer: Arc<dyn EventConsumer>) -> Self {
        Self { codec, consumer }
    }

    /// Routes one frame.
    pub fn route(&self, frame: &[u8]) -> RouteOutcome {
        match decode_event(&self.codec, frame) {
            Ok(ServerEvent::ChatMessage(message)) => {
                tracing::debug!(
                    message_id = %message.id,
                    sender = %message.sender,
                    "chat message received"
                );
                self.consumer.on_chat_message(message);
                RouteOutcome::Delivered
            }
            Ok(ServerEvent::InvalidCommand) => {
                tracing::warn!("server rejected the last command");
                RouteOutcome::Rejected
            }
            Err(ProtocolError::UnknownKind(kind)) => {
                tracing::warn!(%kind, "discarding frame of unknown type");
                RouteOutcome::Discarded
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    frame = %String::from_utf8_lossy(frame),
                    "discarding malformed frame"
                );
                RouteOutcome::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chatsync_protocol::{ChannelId, MessageId, UserId};
    use chatsync_store::ChannelState;
    use chrono::DateTime;

    use super::*;

    const CHAT_FRAME: &[u8] = br#"{"type":"ChatMessage","id":"m1","channel_id":"c1","sender":"bob","created":1000,"content":"hello"}"#;

    fn router_with_store() -> (FrameRouter, ChannelStore) {
        let store = ChannelStore::default();
        let router = FrameRouter::new(Arc::new(store.clone()));
        (router, store)
    }

    #[test]
    fn test_route_chat_message_appends_and_adopts_channel() {
        let (router, store) = router_with_store();

        assert_eq!(router.route(CHAT_FRAME), RouteOutcome::Delivered);

        let state = store.snapshot();
        assert_eq!(state.channel_id, Some(ChannelId::new("c1")));
        assert_eq!(
            state.messages,
            vec![ChatMessage {
                id: MessageId::new("m1"),
                channel_id: ChannelId::new("c1"),
                sender: UserId::new("bob"),
                created_at: DateTime::from_timestamp_millis(1000).unwrap(),
                content: "hello".into(),
            }]
        );
    }

    #[test]
    fn test_route_malformed_json_dispatches_nothing() {
        let (router, store) = router_with_store();
        let sub = store.subscribe();

        assert_eq!(router.route(b"{not json"), RouteOutcome::Discarded);

        assert!(!sub.has_changed(), "no action should have been dispatched");
        assert_eq!(store.snapshot(), ChannelState::default());
    }

    #[test]
    fn test_route_invalid_command_dispatches_nothing() {
        let (router, store) = router_with_store();
        let sub = store.subscribe();

        assert_eq!(router.route(br#"{"type":"InvalidCommand"}"#), RouteOutcome::Rejected);

        assert!(!sub.has_changed());
        assert_eq!(store.snapshot(), ChannelState::default());
    }

    #[test]
    fn test_route_unknown_type_is_discarded() {
        let (router, store) = router_with_store();
        let sub = store.subscribe();

        assert_eq!(
            router.route(br#"{"type":"Typing","user":"bob"}"#),
            RouteOutcome::Discarded
        );
        assert!(!sub.has_changed());
    }

    #[test]
    fn test_route_non_utf8_bytes_is_discarded() {
        let (router, _store) = router_with_store();
        assert_eq!(router.route(&[0xff, 0xfe, 0x00]), RouteOutcome::Discarded);
    }

    #[test]
    fn test_route_preserves_delivery_order() {
        let (router, store) = router_with_store();
        for i in 0..3 {
            // Newest timestamp first, to prove nothing gets re-sorted.
            let frame = format!(
                r#"{{"type":"ChatMessage","id":"m{i}","channel_id":"c1","sender":"bob","created":{},"content":"x"}}"#,
                3000 - i * 1000
            );
            router.route(frame.as_bytes());
        }
        let ids: Vec<_> = store
            .snapshot()
            .messages
            .iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, ["m0", "m1", "m2"]);
    }
}
