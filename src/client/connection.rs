use std::sync::Arc;
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::models::{ErrorMessage, PingMessage, ReceivedMessage, SendMessage};
use super::error::ClientError;
use super::sync_state::{Applied, ClientSyncState, SyncPhase};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// What the application hears about after an inbound frame was reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Joined { room_id: String, buffer: String, language: String, users: Vec<String> },
    BufferChanged(String),
    LanguageChanged(String),
    RosterChanged(Vec<String>),
    Rejected(ErrorMessage),
    Pong,
    Disconnected,
}

/// A participant's end of the sync protocol over a WebSocket.
///
/// Local edits go into the mirror and out on the socket right away. A reader
/// task applies inbound frames to the same mirror in arrival order.
pub struct SyncClient {
    state: Arc<Mutex<ClientSyncState>>,
    writer: Arc<Mutex<WsSink>>,
    event_rx: Option<mpsc::Receiver<SyncEvent>>,
    reader: JoinHandle<()>,
}

impl SyncClient {
    /// Open a connection to the server's `/ws` endpoint.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
        info!("Connected to {}", url);
        let (ws_writer, mut ws_reader) = ws_stream.split();

        let state = Arc::new(Mutex::new(ClientSyncState::new()));
        let (event_tx, event_rx) = mpsc::channel(256);

        let reader_state = state.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = ws_reader.next().await {
                let msg = match frame {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("WebSocket read failed: {}", e);
                        break;
                    }
                };
                if msg.is_close() {
                    break;
                }
                if !msg.is_text() {
                    continue;
                }
                let inbound = match msg.to_text().map(|text| serde_json::from_str::<SendMessage>(text)) {
                    Ok(Ok(inbound)) => inbound,
                    Ok(Err(e)) => {
                        warn!("Ignoring malformed frame: {}", e);
                        continue;
                    }
                    Err(e) => {
                        warn!("Ignoring non-UTF-8 frame: {}", e);
                        continue;
                    }
                };

                let event = {
                    let mut state = reader_state.lock().await;
                    match state.apply(&inbound) {
                        Applied::Joined => Some(SyncEvent::Joined {
                            room_id: state.room_id().unwrap_or_default().to_string(),
                            buffer: state.buffer().to_string(),
                            language: state.language().to_string(),
                            users: state.roster().to_vec(),
                        }),
                        Applied::Buffer => Some(SyncEvent::BufferChanged(state.buffer().to_string())),
                        Applied::Language => Some(SyncEvent::LanguageChanged(state.language().to_string())),
                        Applied::Roster => Some(SyncEvent::RosterChanged(state.roster().to_vec())),
                        Applied::Rejected(e) => Some(SyncEvent::Rejected(e)),
                        Applied::Pong => Some(SyncEvent::Pong),
                        Applied::Ignored => {
                            debug!("Ignored frame for another room or phase");
                            None
                        }
                    }
                };
                if let Some(event) = event {
                    if event_tx.send(event).await.is_err() {
                        debug!("Event receiver dropped");
                    }
                }
            }

            reader_state.lock().await.connection_lost();
            if event_tx.send(SyncEvent::Disconnected).await.is_err() {
                debug!("Event receiver dropped before disconnect");
            }
            info!("Connection to server closed");
        });

        Ok(Self {
            state,
            writer: Arc::new(Mutex::new(ws_writer)),
            event_rx: Some(event_rx),
            reader,
        })
    }

    /// Take the event receiver (can only be called once).
    pub fn take_event_rx(&mut self) -> Option<mpsc::Receiver<SyncEvent>> {
        self.event_rx.take()
    }

    /// Join a room, leaving the current one if any.
    pub async fn join(&self, room_id: &str, display_name: &str) -> Result<(), ClientError> {
        self.state.lock().await.request_join(room_id, display_name);
        self.flush().await
    }

    /// Replace the buffer locally and send it. Returns false if unchanged.
    pub async fn edit_buffer(&self, text: &str) -> Result<bool, ClientError> {
        let changed = self.state.lock().await.edit_buffer(text)?;
        if changed {
            self.flush().await?;
        }
        Ok(changed)
    }

    /// Switch language locally and send it. Returns false if unchanged.
    pub async fn edit_language(&self, tag: &str) -> Result<bool, ClientError> {
        let changed = self.state.lock().await.edit_language(tag)?;
        if changed {
            self.flush().await?;
        }
        Ok(changed)
    }

    /// Leave the current room. Does nothing when not in a room.
    pub async fn leave(&self) -> Result<(), ClientError> {
        let mut writer = self.writer.lock().await;
        let frame = self.state.lock().await.leave();
        match frame {
            Some(frame) => send_frame(&mut writer, &frame).await,
            None => Ok(()),
        }
    }

    pub async fn ping(&self, nonce: Option<String>) -> Result<(), ClientError> {
        let mut writer = self.writer.lock().await;
        send_frame(&mut writer, &ReceivedMessage::Ping(PingMessage { nonce })).await
    }

    /// Close the socket. The server treats this as an implicit leave.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.writer.lock().await.close().await?;
        Ok(())
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase().clone()
    }

    pub async fn buffer(&self) -> String {
        self.state.lock().await.buffer().to_string()
    }

    pub async fn language(&self) -> String {
        self.state.lock().await.language().to_string()
    }

    pub async fn roster(&self) -> Vec<String> {
        self.state.lock().await.roster().to_vec()
    }

    /// Send every queued frame. The writer lock is held across take and send
    /// so concurrent edits go out in the order they were queued.
    async fn flush(&self) -> Result<(), ClientError> {
        let mut writer = self.writer.lock().await;
        let pending = self.state.lock().await.take_pending();
        for frame in &pending {
            send_frame(&mut writer, frame).await?;
        }
        Ok(())
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn send_frame(writer: &mut WsSink, frame: &ReceivedMessage) -> Result<(), ClientError> {
    let text = serde_json::to_string(frame)?;
    writer.send(Message::text(text)).await?;
    Ok(())
}
