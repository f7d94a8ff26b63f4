//! `ChatClient` builder and handle.
//!
//! This is the entry point for embedding the chat core in an application.
//! It ties the layers together: transport → protocol → store → session.

use std::sync::Arc;

use chatsync_store::{ChannelState, ChannelStore, StoreSubscription};
use chatsync_transport::{Connector, WebSocketConnector};
use tokio::sync::watch;

use crate::{ChatSession, ClientConfig, ClientError, ConnectionManager, ConnectionState};

/// Builder for configuring and connecting a [`ChatClient`].
///
/// # Example
///
/// ```rust,no_run
/// use chatsync::ChatClient;
///
/// # async fn run() -> Result<(), chatsync::ClientError> {
/// let client = ChatClient::builder()
///     .endpoint("ws://localhost:9090/chat")
///     .connect()
///     .await?;
/// client.session().set_local_user("alice");
/// client.session().submit_message("hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatClientBuilder {
    config: ClientConfig,
}

impl ChatClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the server URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Sets the initial channel display name.
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.config.channel_name = name.into();
        self
    }

    /// Connects over WebSocket.
    pub async fn connect(self) -> Result<ChatClient, ClientError> {
        self.connect_with(&WebSocketConnector).await
    }

    /// Connects through a custom [`Connector`].
    pub async fn connect_with<K>(self, connector: &K) -> Result<ChatClient, ClientError>
    where
        K: Connector,
        ClientError: From<K::Error>,
    {
        let store = ChannelStore::new(ChannelState::with_name(self.config.channel_name));
        let manager = Arc::new(ConnectionManager::new(
            self.config.endpoint,
            Arc::new(store.clone()),
        ));
        manager.open(connector).await?;

        let session = ChatSession::new(Arc::clone(&manager), store.clone());
        Ok(ChatClient {
            manager,
            session,
            store,
        })
    }
}

/// A connected chat client.
///
/// Dropping the client closes the connection.
pub struct ChatClient {
    manager: Arc<ConnectionManager>,
    session: ChatSession<Arc<ConnectionManager>>,
    store: ChannelStore,
}

impl ChatClient {
    /// Creates a new builder.
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder::new()
    }

    /// The façade the presentation layer talks to.
    pub fn session(&self) -> &ChatSession<Arc<ConnectionManager>> {
        &self.session
    }

    /// A read-only subscription to channel state.
    pub fn subscribe(&self) -> StoreSubscription {
        self.store.subscribe()
    }

    /// The current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// A receiver notified on every connection state transition.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.manager.watch_state()
    }

    /// Closes the connection and waits until it is closed.
    pub async fn shutdown(self) {
        self.manager.dispose();
        self.manager.closed().await;
    }
}
