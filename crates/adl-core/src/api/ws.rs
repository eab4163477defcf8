//! `/ws`: pushes job updates to the connection that owns each job.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use super::AppState;
use crate::broadcast::UpdateMessage;

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &UpdateMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(text.into())).await
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let broadcaster = Arc::clone(state.pipeline.broadcaster());
    let (conn, mut updates) = broadcaster.register_connection();
    tracing::debug!(
        connection_id = %conn,
        open = broadcaster.connection_count(),
        "websocket connected"
    );
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(message) = update else { break };
                if send(&mut sender, &message).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                match serde_json::from_str::<UpdateMessage>(text.as_str()) {
                    Ok(UpdateMessage::Ping) => {
                        if send(&mut sender, &UpdateMessage::Pong).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(connection_id = %conn, "ignoring client message: {}", e)
                    }
                }
            }
        }
    }

    broadcaster.unregister_connection(conn);
    tracing::debug!(
        connection_id = %conn,
        open = broadcaster.connection_count(),
        "websocket closed"
    );
}
