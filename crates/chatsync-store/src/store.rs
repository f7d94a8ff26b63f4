//! The channel store: the single writer of [`ChannelState`].
//!
//! # Concurrency note
//!
//! The state sits inside a `tokio::sync::watch` channel. `dispatch` runs the
//! reducer inside `send_modify`, which holds the channel's write lock for
//! the duration of one reduction, so two dispatches (one from the UI, one
//! from the connection's event loop) can never interleave. Readers never
//! get a `&mut`: they get clones or a short-lived read guard.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{reduce, Action, ChannelState};

/// Owns the channel state and applies actions to it.
///
/// `ChannelStore` is cheap to clone: clones are handles to the same state,
/// which is how the façade and the connection manager both get a dispatch
/// capability without either of them owning the state.
#[derive(Clone)]
pub struct ChannelStore {
    tx: Arc<watch::Sender<ChannelState>>,
}

impl ChannelStore {
    /// Creates a store holding `initial`.
    pub fn new(initial: ChannelState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Runs one reduction and notifies every subscriber.
    pub fn dispatch(&self, action: Action) {
        self.tx.send_modify(|state| {
            if let Action::AppendMessage(message) = &action {
                if state.is_foreign(message) {
                    // Kept in the log anyway; the adopted channel id stays.
                    tracing::warn!(
                        adopted = ?state.channel_id,
                        received = %message.channel_id,
                        message_id = %message.id,
                        "message for a different channel appended to the log"
                    );
                }
            }
            tracing::trace!(?action, "dispatching action");
            let current = std::mem::take(state);
            *state = reduce(current, action);
        });
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> ChannelState {
        self.tx.borrow().clone()
    }

    /// Runs `f` against the current state without cloning it.
    ///
    /// The store can't be written while `f` runs, so keep it short and
    /// never dispatch from inside it.
    pub fn read<R>(&self, f: impl FnOnce(&ChannelState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Returns a read-only subscription that is notified after every
    /// dispatch.
    pub fn subscribe(&self) -> StoreSubscription {
        StoreSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new(ChannelState::default())
    }
}

/// A read-only view of the store for the presentation layer.
///
/// A new subscription starts out "seen": `has_changed` is `false` until
/// the next dispatch.
#[derive(Clone)]
pub struct StoreSubscription {
    rx: watch::Receiver<ChannelState>,
}

impl StoreSubscription {
    /// Borrows the latest state without marking it as seen.
    ///
    /// Keep the guard short-lived: it blocks dispatches while held.
    pub fn borrow(&self) -> watch::Ref<'_, ChannelState> {
        self.rx.borrow()
    }

    /// Clones the latest state and marks it as seen.
    pub fn snapshot(&mut self) -> ChannelState {
        self.rx.borrow_and_update().clone()
    }

    /// Returns `true` if something was dispatched since the last
    /// [`snapshot`](Self::snapshot) or [`changed`](Self::changed).
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next dispatch.
    ///
    /// Returns `false` once every store handle has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

// =========================================================================
// Tests
// =========================================================================
