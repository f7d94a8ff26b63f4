//! A line-based terminal chat client.
//!
//! ```text
//! cargo run -p terminal-chat -- --endpoint ws://localhost:9090/chat --user alice
//! ```
//!
//! Type a line to post it. Commands: `/user NAME`, `/join`, `/quit`.

use chatsync::prelude::*;
use chatsync::DEFAULT_ENDPOINT;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terminal-chat", version, about = "Chat from the terminal")]
struct Cli {
    /// Chat server WebSocket URL.
    #[arg(long, default_value = DEFAULT_ENDPOINT, value_name = "URL")]
    endpoint: String,
    /// Name to post under. Can be changed later with `/user`.
    #[arg(long)]
    user: Option<String>,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

enum Input<'a> {
    User(&'a str),
    Join,
    Quit,
    Say(&'a str),
}

fn parse_line(line: &str) -> Input<'_> {
    match line.trim_end() {
        "/quit" => Input::Quit,
        "/join" => Input::Join,
        other => match other.strip_prefix("/user ") {
            Some(name) => Input::User(name),
            None => Input::Say(other),
        },
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Prints every message that arrives after `printed` until the client goes away.
async fn print_messages(mut sub: StoreSubscription) {
    let mut printed = 0;
    loop {
        let state = sub.snapshot();
        for msg in state.messages.iter().skip(printed) {
            println!(
                "[{} {}] {}: {}",
                state.channel_name,
                msg.created_at.format("%H:%M:%S"),
                msg.sender,
                msg.content
            );
        }
        printed = state.messages.len();

        if !sub.changed().await {
            return;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ChatClient::builder().endpoint(&cli.endpoint).connect().await?;
    tracing::info!(endpoint = %cli.endpoint, "connected");

    let session = client.session();
    if let Some(user) = &cli.user {
        session.set_local_user(user);
        session.join();
    }

    let printer = tokio::spawn(print_messages(client.subscribe()));
    let mut connection = client.watch_connection();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Input::Quit => break,
                    Input::Join => session.join(),
                    Input::User(name) => session.set_local_user(name),
                    Input::Say(text) => session.submit_message(text),
                }
            }
            changed = connection.wait_for(|s| *s == ConnectionState::Closed) => {
                if changed.is_ok() {
                    eprintln!("server closed the connection");
                }
                break;
            }
        }
    }

    client.shutdown().await;
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_commands() {
        assert!(matches!(parse_line("/quit"), Input::Quit));
        assert!(matches!(parse_line("/join\n"), Input::Join));
        assert!(matches!(parse_line("/user bob"), Input::User("bob")));
    }

    #[test]
    fn test_parse_line_plain_text_is_message() {
        assert!(matches!(parse_line("hello there"), Input::Say("hello there")));
        assert!(matches!(parse_line("/users"), Input::Say("/users")));
    }
}
