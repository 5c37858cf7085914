use std::sync::Arc;
use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::models::{ReceivedMessage, SendMessage};
use crate::rooms::{ConnectionId, RoomRegistry};
use super::dispatch;

/// Leaves the connection's room when dropped, so a handler that is torn down
/// without reaching its cleanup still counts as an implicit leave.
struct DeferDisconnect {
    registry: Arc<RoomRegistry>,
    connection_id: ConnectionId,
}

impl Drop for DeferDisconnect {
    fn drop(&mut self) {
        let registry = self.registry.clone();
        let connection_id = self.connection_id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                registry.disconnect(connection_id).await;
            });
        }
    }
}

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {

    // Generate unique connection ID to identify this client
    let connection_id = Uuid::new_v4();
    info!("WebSocket connection established with connection_id: {}", connection_id);

    let registry = app_state.registry.clone();
    let (outbox, mut inbox) = mpsc::channel::<SendMessage>(app_state.outbox_capacity);
    let mut eviction = registry.register_connection(connection_id, outbox).await;
    let _defer_disconnect = DeferDisconnect {
        registry: registry.clone(),
        connection_id,
    };

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Drain the outbox onto the socket. Everything this client sees, room
    // fan-out and direct replies alike, goes through this one queue.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize frame for connection {}: {}", connection_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                debug!("Socket of connection {} closed while sending", connection_id);
                break;
            }
        }
    });

    // Read frames and apply them in arrival order. Dispatch runs in the select
    // arm body, so a closing writer never cancels a half-applied operation.
    loop {
        tokio::select! {
            frame = receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    // Transport-level ping/pong is answered by axum; binary frames are not part of the protocol
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("WebSocket error on connection {}: {}", connection_id, e);
                        break;
                    }
                };

                let json_msg: ReceivedMessage = match serde_json::from_str(&text) {
                    Ok(json_msg) => json_msg,
                    Err(e) => {
                        error!("Failed to parse message from connection {}: {}", connection_id, e);
                        continue;
                    }
                };
                dispatch(json_msg, connection_id, &registry).await;
            }
            _ = &mut send_task => break,
            _ = &mut eviction => {
                // Reaped after a failed delivery; closing the socket tells the client it left.
                warn!("Connection {} evicted, closing socket", connection_id);
                break;
            }
        }
    }
    send_task.abort();

    // Transport loss is an implicit leave
    registry.disconnect(connection_id).await;
    info!("WebSocket connection {} terminated", connection_id);
}
