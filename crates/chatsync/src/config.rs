//! Client configuration.

use chatsync_store::DEFAULT_CHANNEL_NAME;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:9090/chat";

/// Settings for a [`ChatClient`](crate::ChatClient).
///
/// Start from `ClientConfig::default()` and override the fields you care
/// about, or go through [`ChatClientBuilder`](crate::ChatClientBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the chat server. One connection is made to it per
    /// client; there is no reconnect.
    pub endpoint: String,

    /// Display name for the channel until the server says otherwise.
    pub channel_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}
