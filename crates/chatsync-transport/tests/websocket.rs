//! Integration tests for the WebSocket client transport.
//!
//! These tests spin up a real WebSocket server (raw `tokio-tungstenite`)
//! on a random local port and connect to it with [`WebSocketConnector`],
//! so frames actually cross the network stack.

#[cfg(feature = "websocket")]
mod websocket {
    use chatsync_transport::{Connection, Connector, TransportError, WebSocketConnector};
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Helper: binds a listener on an OS-assigned port and returns its
    /// `ws://` URL plus a task that resolves to the accepted server side.
    async fn start_server() -> (String, tokio::task::JoinHandle<ServerWs>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("should accept");
            tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake should succeed")
        });
        (format!("ws://{addr}/chat"), handle)
    }

    #[tokio::test]
    async fn test_connect_send_and_receive_text_frames() {
        let (url, server) = start_server().await;

        let conn = WebSocketConnector
            .connect(&url)
            .await
            .expect("client should connect");
        let mut server_ws = server.await.expect("task should complete");

        assert!(conn.id().into_inner() > 0);

        // --- Client sends, server receives a *text* frame ---
        conn.send(br#"{"type":"Join","user":"alice"}"#)
            .await
            .expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON should travel as a text frame");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"Join","user":"alice"}"#);

        // --- Server sends, client receives ---
        server_ws
            .send(Message::text(r#"{"type":"InvalidCommand"}"#.to_owned()))
            .await
            .unwrap();
        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"type":"InvalidCommand"}"#);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_server_close() {
        let (url, server) = start_server().await;
        let conn = WebSocketConnector.connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_returns_connect_failed() {
        // Bind then drop to get a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = WebSocketConnector.connect(&format!("ws://{addr}/chat")).await;
        assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
    }

    #[tokio::test]
    async fn test_connect_invalid_url_returns_connect_failed() {
        let result = WebSocketConnector.connect("not a url").await;
        assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
    }
}
