//! WebSocket connection worker.
//!
//! Each accepted TCP stream gets one worker: it performs the upgrade, then
//! runs a reader loop that feeds commands into a [`GameSession`] while a
//! writer task drains the connection's outbound queue into the socket.

use crate::{
    connection::{Identity, SessionRegistry},
    error::ServerError,
    messaging::{decode_command, encode_update, text, Update},
    server::session::{GameSession, SessionFlow},
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message};
use tracing::{error, info, warn};

/// Runs one client connection until its stream ends.
///
/// # Arguments
///
/// * `stream` - The accepted TCP stream
/// * `addr` - Remote address, used as the player identity
/// * `registry` - The shared session registry
/// * `handshake_timeout` - Upper bound for the WebSocket upgrade
///
/// # Errors
///
/// Returns [`ServerError::Network`] when the upgrade fails or times out. See
/// [`run_session`] for the errors of an established connection.
pub async fn handle_connection(
    stream: TcpStream,
    addr: Identity,
    registry: Arc<SessionRegistry>,
    handshake_timeout: Duration,
) -> Result<(), ServerError> {
    let ws_stream = tokio::time::timeout(handshake_timeout, accept_async(stream))
        .await
        .map_err(|_| ServerError::Network(format!("WebSocket handshake with {addr} timed out")))?
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    info!("🔗 WebSocket connection established from {}", addr);

    let (ws_sender, ws_receiver) = ws_stream.split();
    let outcome = run_session(addr, registry, ws_sender, ws_receiver).await;

    info!("🔌 Connection from {} closed", addr);
    outcome
}

/// Serves an established connection: frames from `ws_receiver` become
/// commands, queued updates are written to `ws_sender`.
///
/// The worker ends when the client closes, a read or a write fails, or an
/// admission is refused. The player always leaves the session on the way out.
///
/// # Errors
///
/// Returns [`ServerError::Stream`] when reading or writing fails and
/// [`ServerError::Internal`] if the writer task panics.
pub async fn run_session<Si, St, E>(
    addr: Identity,
    registry: Arc<SessionRegistry>,
    ws_sender: Si,
    mut ws_receiver: St,
) -> Result<(), ServerError>
where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display,
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let (outbound, updates) = mpsc::unbounded_channel::<Update>();
    let mut writer = tokio::spawn(write_updates(addr, ws_sender, updates));

    let session = GameSession::new(addr, registry, outbound);
    let mut outcome = Ok(());
    let mut writer_result = None;

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                let Some(frame) = frame else { break };
                match frame {
                    Ok(Message::Text(payload)) => match decode_command(payload.as_str()) {
                        Ok(command) => {
                            if session.handle(command).await == SessionFlow::Close {
                                info!("Closing connection from {}", addr);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Unrecognized command from {}: {}", addr, e);
                            session.reply(Update::text(text::UNRECOGNIZED_COMMAND));
                        }
                    },
                    Ok(Message::Close(_)) => {
                        info!("Client {} requested close", addr);
                        break;
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(_) => {
                        warn!("Unsupported frame from {}", addr);
                        session.reply(Update::text(text::UNRECOGNIZED_COMMAND));
                    }
                    Err(e) => {
                        outcome = Err(ServerError::Stream(format!("Read from {addr} failed: {e}")));
                        break;
                    }
                }
            }
            // The session keeps a sender alive, so the writer only finishes early on failure.
            finished = &mut writer => {
                writer_result = Some(finished);
                break;
            }
        }
    }

    session.disconnect().await;
    // Dropping the last sender lets the writer flush and close.
    drop(session);

    let finished = match writer_result {
        Some(finished) => finished,
        None => writer.await,
    };
    let writer_outcome = match finished {
        Ok(result) => result,
        Err(e) => {
            error!("Writer task for {} failed: {}", addr, e);
            Err(ServerError::Internal(format!("Writer task for {addr} failed: {e}")))
        }
    };
    outcome.and(writer_outcome)
}

async fn write_updates<Si>(
    addr: Identity,
    mut ws_sender: Si,
    mut updates: mpsc::UnboundedReceiver<Update>,
) -> Result<(), ServerError>
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    while let Some(update) = updates.recv().await {
        let text = match encode_update(&update) {
            Ok(text) => text,
            Err(e) => {
                error!("Dropping update for {}: {}", addr, e);
                continue;
            }
        };
        if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
            warn!("Failed to send update to {}: {}", addr, e);
            return Err(ServerError::Stream(format!("Write to {addr} failed: {e}")));
        }
    }
    let _ = ws_sender.send(Message::Close(None)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SessionPhase;
    use crate::messaging::Command;
    use futures::channel::mpsc as frames;
    use tokio::time::timeout;

    fn addr(port: u16) -> Identity {
        Identity::from(([127, 0, 0, 1], port))
    }

    fn text_frame(payload: &str) -> Result<Message, std::io::Error> {
        Ok(Message::Text(payload.to_string().into()))
    }

    #[tokio::test]
    async fn test_write_failure_ends_worker_and_notifies_opponent() {
        let registry = Arc::new(SessionRegistry::new());
        let (tx_alice, mut rx_alice) = mpsc::unbounded_channel();
        let alice = GameSession::new(addr(1), registry.clone(), tx_alice);
        alice
            .handle(Command::Connect {
                nickname: "alice".to_string(),
            })
            .await;

        // A sink whose receiving end is gone rejects every write.
        let (broken_sink, gone) = frames::channel::<Message>(0);
        drop(gone);
        // The inbound side stays open, so only the failed write can end the worker.
        let (inbound, ws_receiver) = frames::unbounded();
        inbound
            .unbounded_send(text_frame(r#"{"command":"connect","nickname":"bob"}"#))
            .unwrap();

        let result = timeout(
            Duration::from_secs(5),
            run_session(addr(2), registry.clone(), broken_sink, ws_receiver),
        )
        .await
        .expect("worker kept running after its writer failed");

        assert!(matches!(result, Err(ServerError::Stream(_))));
        assert_eq!(registry.player_count().await, 1);
        assert_eq!(registry.phase().await, SessionPhase::Terminal);

        let mut last = None;
        while let Ok(update) = rx_alice.try_recv() {
            last = Some(update);
        }
        assert_eq!(last, Some(Update::text(text::OPPONENT_LEFT)));
        drop(inbound);
    }

    #[tokio::test]
    async fn test_read_failure_ends_worker() {
        let registry = Arc::new(SessionRegistry::new());
        let (sink, mut written) = frames::unbounded::<Message>();
        let (inbound, ws_receiver) = frames::unbounded();
        inbound
            .unbounded_send(text_frame(r#"{"command":"connect","nickname":"alice"}"#))
            .unwrap();
        inbound
            .unbounded_send(Err(std::io::Error::other("connection reset")))
            .unwrap();

        let result = timeout(
            Duration::from_secs(5),
            run_session(addr(1), registry.clone(), sink, ws_receiver),
        )
        .await
        .expect("worker kept running after a read error");

        assert!(matches!(result, Err(ServerError::Stream(_))));
        assert_eq!(registry.player_count().await, 0);

        let first = written.next().await.unwrap();
        assert!(matches!(first, Message::Text(_)));
        assert!(matches!(written.next().await, Some(Message::Close(None))));
    }
}
