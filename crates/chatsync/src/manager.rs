//! The connection manager: one server connection, from dial to teardown.
//!
//! The manager hides the transport behind a single capability,
//! [`IntentSink::send`]. Everything else about the socket (connecting,
//! reading frames, logging failures, closing) happens here and nowhere
//! else.
//!
//! ## Lifecycle
//!
//! ```text
//!  Idle ──open()──→ Connecting ──ok──→ Open ──server close / recv error──→ Closed
//!                        │                 │
//!                        └──connect err────┴──────────dispose()────────────→ Closed
//! ```
//!
//! Transport errors are not a state of their own: they are logged, and the
//! connection either stays `Open` (a failed send) or moves to `Closed` (a
//! failed receive), following what the socket reports. There is exactly one
//! connection attempt per manager and no reconnect.
//!
//! ## Event loop
//!
//! Once open, a spawned task owns the connection and `select!`s between
//! two sources:
//!
//! - the outbound command queue (`send` pushes encoded frames onto it)
//! - the next inbound frame, which goes through the [`FrameRouter`]
//!
//! Inbound frames are routed one at a time in delivery order, so each frame
//! causes at most one store reduction before the next one is looked at.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chatsync_protocol::{encode_intent, ClientIntent, JsonCodec};
use chatsync_transport::ConnectionId;
use chatsync_transport::{Connection, Connector};
use tokio::sync::{mpsc, watch};

use crate::router::{EventConsumer, FrameRouter};
use crate::ClientError;

/// The one thing the session façade may do with a connection: hand it an
/// intent to deliver.
///
/// Delivery is best-effort. Implementations drop intents they can't send
/// right now instead of queueing them for later.
pub trait IntentSink: Send + Sync {
    /// Sends `intent` to the server, or drops it.
    fn send(&self, intent: ClientIntent);
}

impl<T: IntentSink + ?Sized> IntentSink for Arc<T> {
    fn send(&self, intent: ClientIntent) {
        (**self).send(intent)
    }
}

/// Externally observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, `open` not called yet.
    Idle,
    /// The one connection attempt is in flight.
    Connecting,
    /// Connected; intents are delivered.
    Open,
    /// Finished, for whatever reason. Terminal.
    Closed,
}

/// Instructions for the event loop.
enum Command {
    /// Write one encoded frame.
    Send(Vec<u8>),
    /// Close the connection and stop.
    Close,
}

/// State shared between the manager and its event-loop task.
struct Shared {
    state: watch::Sender<ConnectionState>,
    disposed: AtomicBool,
    /// Held while a frame is routed. `dispose` takes it once, so no frame
    /// is still being routed after `dispose` returns.
    route_gate: Mutex<()>,
    router: FrameRouter,
}

impl Shared {
    fn route_unless_disposed(&self, conn_id: ConnectionId, data: &[u8]) {
        let _gate = self.route_gate.lock().unwrap_or_else(PoisonError::into_inner);
        if self.disposed.load(Ordering::SeqCst) {
            tracing::debug!(%conn_id, "dropping frame received after disposal");
            return;
        }
        self.router.route(data);
    }
}

/// Moves the state from `Connecting` to `Closed` if the connection attempt
/// is abandoned before it settles.
struct ConnectAttempt<'a> {
    state: &'a watch::Sender<ConnectionState>,
    settled: bool,
}

impl Drop for ConnectAttempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Closed;
                true
            } else {
                false
            }
        });
    }
}

/// Owns the client's single connection to the chat server.
pub struct ConnectionManager {
    endpoint: String,
    codec: JsonCodec,
    shared: Arc<Shared>,
    /// Set once, when the connection opens.
    commands: OnceLock<mpsc::UnboundedSender<Command>>,
}

impl ConnectionManager {
    /// Creates an idle manager for `endpoint`. Valid chat messages received
    /// later are forwarded to `consumer`.
    pub fn new(endpoint: impl Into<String>, consumer: Arc<dyn EventConsumer>) -> Self {
        let (state, _rx) = watch::channel(ConnectionState::Idle);
        Self {
            endpoint: endpoint.into(),
            codec: JsonCodec,
            shared: Arc::new(Shared {
                state,
                disposed: AtomicBool::new(false),
                route_gate: Mutex::new(()),
                router: FrameRouter::new(consumer),
            }),
            commands: OnceLock::new(),
        }
    }

    /// The endpoint this manager connects to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Returns a receiver that is notified on every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }

    /// Makes the manager's one connection attempt.
    ///
    /// On success the event loop is running and the state is `Open`.
    ///
    /// # Errors
    /// - [`ClientError::AlreadyStarted`] if `open` was called before
    /// - [`ClientError::Disposed`] if the manager was disposed first
    /// - the connector's error (converted) if the attempt failed; the
    ///   state is then `Closed`
    ///
    /// Dropping the returned future mid-dial also leaves the state `Closed`.
    pub async fn open<K>(&self, connector: &K) -> Result<(), ClientError>
    where
        K: Connector,
        ClientError: From<K::Error>,
    {
        if self.is_disposed() {
            return Err(ClientError::Disposed);
        }

        // Claim the Idle → Connecting transition atomically, so two
        // concurrent `open` calls can't both dial.
        let claimed = self.shared.state.send_if_modified(|state| {
            if *state == ConnectionState::Idle {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ClientError::AlreadyStarted);
        }

        tracing::info!(endpoint = %self.endpoint, "connecting");
        let mut attempt = ConnectAttempt {
            state: &self.shared.state,
            settled: false,
        };

        let conn = match connector.connect(&self.endpoint).await {
            Ok(conn) => conn,
            Err(e) => {
                // `attempt` moves the state to Closed on the way out.
                tracing::warn!(endpoint = %self.endpoint, error = %e, "connect failed");
                return Err(e.into());
            }
        };
        let conn_id = conn.id();

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = self.commands.set(tx.clone());

        if self.is_disposed() {
            // Disposed while we were dialing: the loop closes the socket
            // straight away.
            let _ = tx.send(Command::Close);
        } else {
            self.shared.state.send_replace(ConnectionState::Open);
            tracing::info!(%conn_id, endpoint = %self.endpoint, "connection open");
        }
        attempt.settled = true;

        tokio::spawn(run_event_loop(conn, rx, Arc::clone(&self.shared)));
        Ok(())
    }

    /// Encodes and queues `intent`, reporting why it couldn't be.
    ///
    /// [`IntentSink::send`] is the fire-and-forget version of this.
    ///
    /// # Errors
    /// - [`ClientError::Disposed`] after disposal
    /// - [`ClientError::NotOpen`] unless the connection is `Open`
    /// - [`ClientError::Protocol`] if the intent can't be encoded
    pub fn try_send(&self, intent: &ClientIntent) -> Result<(), ClientError> {
        if self.is_disposed() {
            return Err(ClientError::Disposed);
        }
        let state = self.state();
        if state != ConnectionState::Open {
            return Err(ClientError::NotOpen(state));
        }
        let frame = encode_intent(&self.codec, intent)?;
        let commands = self.commands.get().ok_or(ClientError::NotOpen(state))?;
        commands
            .send(Command::Send(frame))
            .map_err(|_| ClientError::NotOpen(ConnectionState::Closed))
    }

    /// Tears the connection down.
    ///
    /// Idempotent: the socket is closed exactly once no matter how often
    /// this is called. Afterwards sends are dropped and inbound frames are
    /// no longer routed, even ones already in flight. If a frame is being
    /// routed right now, this waits for it to finish, so an
    /// [`EventConsumer`] must not call `dispose` itself.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        drop(
            self.shared
                .route_gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        match self.commands.get() {
            Some(commands) => {
                // The loop may already be gone (server closed first).
                let _ = commands.send(Command::Close);
            }
            None => {
                self.shared.state.send_replace(ConnectionState::Closed);
            }
        }
        tracing::info!(endpoint = %self.endpoint, "connection manager disposed");
    }

    /// Waits until the state is `Closed`.
    pub async fn closed(&self) {
        let mut rx = self.shared.state.subscribe();
        // The sender lives in `self.shared`, so this can't see a dropped
        // channel while `self` is borrowed.
        let _ = rx.wait_for(|state| *state == ConnectionState::Closed).await;
    }
}

impl IntentSink for ConnectionManager {
    fn send(&self, intent: ClientIntent) {
        let kind = intent.kind();
        match self.try_send(&intent) {
            Ok(()) => tracing::debug!(%kind, "intent queued"),
            Err(ClientError::Protocol(e)) => {
                tracing::warn!(%kind, error = %e, "intent could not be encoded");
            }
            Err(e) => tracing::debug!(%kind, error = %e, "intent dropped"),
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Drives one open connection until it closes.
async fn run_event_loop<T: Connection>(
    conn: T,
    mut commands: mpsc::UnboundedReceiver<Command>,
    shared: Arc<Shared>,
) {
    let conn_id = conn.id();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(frame)) => {
                    // A failed write doesn't end the connection; a broken
                    // socket shows up on the receive side.
                    if let Err(e) = conn.send(&frame).await {
                        tracing::warn!(%conn_id, error = %e, "send failed");
                    }
                }
                Some(Command::Close) | None => {
                    if let Err(e) = conn.close().await {
                        tracing::warn!(%conn_id, error = %e, "close failed");
                    }
                    tracing::info!(%conn_id, "connection closed by client");
                    break;
                }
            },
            frame = conn.recv() => match frame {
                Ok(Some(data)) => shared.route_unless_disposed(conn_id, &data),
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed by server");
                    break;
                }
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "transport error, closing");
                    break;
                }
            },
        }
    }

    shared.state.send_replace(ConnectionState::Closed);
}

// =========================================================================
// Tests
// =========================================================================
