//! The session façade: the only API the presentation layer calls.
//!
//! A [`ChatSession`] is handed its two collaborators at construction: an
//! [`IntentSink`] to talk to the server and a [`ChannelStore`] to read and
//! update local state. It never looks either of them up on its own.
//!
//! Blank input (an empty message, a whitespace-only user id) is a normal
//! thing for a UI to produce, so it is ignored silently rather than
//! reported as an error.

use chatsync_protocol::{ClientIntent, UserId};
use chatsync_store::{Action, ChannelState, ChannelStore, StoreSubscription};

use crate::IntentSink;

/// User-facing operations on the chat channel.
pub struct ChatSession<S: IntentSink> {
    sink: S,
    store: ChannelStore,
}

impl<S: IntentSink> ChatSession<S> {
    /// Creates a session that sends through `sink` and reads/writes `store`.
    pub fn new(sink: S, store: ChannelStore) -> Self {
        Self { sink, store }
    }

    /// Posts a message to the channel as the current local user.
    ///
    /// Does nothing if `content` is blank. Otherwise `content` is sent as
    /// typed, under the empty user if none has been set yet. The message is
    /// *not* added to the store here: it shows up once the server echoes it
    /// back.
    pub fn submit_message(&self, content: &str) {
        if content.trim().is_empty() {
            return;
        }
        let user = self.local_user().unwrap_or_default();

        self.store
            .dispatch(Action::SendMessageRequested(user.clone(), content.to_owned()));
        self.sink.send(ClientIntent::SendMessage {
            user,
            content: content.to_owned(),
        });
    }

    /// Sets the label this client posts under.
    ///
    /// Surrounding whitespace is trimmed; blank input is ignored.
    pub fn set_local_user(&self, id: &str) {
        if let Some(user) = UserId::parse(id) {
            tracing::debug!(%user, "local user changed");
            self.store.dispatch(Action::ChangeUser(user));
        }
    }

    /// Announces the current local user to the server.
    ///
    /// Does nothing if no local user has been set.
    pub fn join(&self) {
        if let Some(user) = self.local_user() {
            self.sink.send(ClientIntent::Join { user });
        }
    }

    /// A copy of the current channel state.
    pub fn state(&self) -> ChannelState {
        self.store.snapshot()
    }

    /// A read-only subscription to channel state changes.
    pub fn subscribe(&self) -> StoreSubscription {
        self.store.subscribe()
    }

    fn local_user(&self) -> Option<UserId> {
        self.store.read(|state| state.local_user.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Façade tests use a recording sink, so every intent the session
    //! tries to send can be inspected.

    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<ClientIntent>>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<ClientIntent> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl IntentSink for RecordingSink {
        fn send(&self, intent: ClientIntent) {
            self.sent.lock().unwrap().push(intent);
        }
    }

    fn session() -> (ChatSession<RecordingSink>, RecordingSink, ChannelStore) {
        let sink = RecordingSink::default();
        let store = ChannelStore::default();
        (ChatSession::new(sink.clone(), store.clone()), sink, store)
    }

    // =====================================================================
    // Blank input
    // =====================================================================

    #[test]
    fn test_blank_input_dispatches_and_sends_nothing() {
        let (session, sink, store) = session();
        session.set_local_user("alice");
        let sub = store.subscribe();

        session.submit_message("");
        session.submit_message("   ");
        session.set_local_user("");
        session.set_local_user(" \t ");

        assert!(!sub.has_changed(), "no action should be dispatched");
        assert!(sink.sent().is_empty(), "nothing should be sent");
    }

    // =====================================================================
    // set_local_user()
    // =====================================================================

    #[test]
    fn test_set_local_user_updates_store() {
        let (session, sink, _store) = session();
        session.set_local_user("alice");
        assert_eq!(session.state().local_user, Some(UserId::new("alice")));
        assert!(sink.sent().is_empty(), "changing user is local only");
    }

    #[test]
    fn test_set_local_user_trims_whitespace() {
        let (session, _sink, _store) = session();
        session.set_local_user("  alice  ");
        assert_eq!(session.state().local_user, Some(UserId::new("alice")));
    }

    // =====================================================================
    // submit_message()
    // =====================================================================

    #[test]
    fn test_submit_sends_once_without_local_echo() {
        let (session, sink, _store) = session();
        session.set_local_user("alice");

        session.submit_message("hi");

        assert_eq!(
            sink.sent(),
            vec![ClientIntent::SendMessage {
                user: UserId::new("alice"),
                content: "hi".into(),
            }]
        );
        assert!(session.state().messages.is_empty(), "no optimistic echo");
    }

    #[test]
    fn test_submit_sends_content_as_typed() {
        let (session, sink, _store) = session();
        session.set_local_user("alice");

        session.submit_message("  hi  ");

        assert_eq!(
            sink.sent(),
            vec![ClientIntent::SendMessage {
                user: UserId::new("alice"),
                content: "  hi  ".into(),
            }]
        );
    }

    #[test]
    fn test_submit_without_local_user_sends_with_empty_user() {
        let (session, sink, store) = session();
        let sub = store.subscribe();

        session.submit_message("hi");

        assert_eq!(
            sink.sent(),
            vec![ClientIntent::SendMessage {
                user: UserId::default(),
                content: "hi".into(),
            }]
        );
        assert!(sub.has_changed(), "the request is still dispatched");
        assert_eq!(store.snapshot().local_user, None);
        assert!(store.snapshot().messages.is_empty());
    }

    #[test]
    fn test_submit_uses_latest_local_user() {
        let (session, sink, _store) = session();
        session.set_local_user("alice");
        session.set_local_user("bob");

        session.submit_message("hey");

        assert_eq!(sink.sent()[0].user(), &UserId::new("bob"));
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_sends_join_for_local_user() {
        let (session, sink, _store) = session();
        session.set_local_user("alice");
        session.join();
        assert_eq!(
            sink.sent(),
            vec![ClientIntent::Join {
                user: UserId::new("alice")
            }]
        );
    }

    #[test]
    fn test_join_without_local_user_is_noop() {
        let (session, sink, _store) = session();
        session.join();
        assert!(sink.sent().is_empty());
    }
}
