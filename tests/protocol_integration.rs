//! Wire-level tests that speak raw JSON frames to the server.

use std::sync::Arc;
use codefun_sync::build_app;
use codefun_sync::config::Config;
use codefun_sync::rooms::{LanguageSet, RoomRegistry};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_test_server() -> (String, Arc<RoomRegistry>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let registry = Arc::new(RoomRegistry::new(LanguageSet::default()));
    let app = build_app(&Config::default(), registry.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("ws://127.0.0.1:{port}/ws"), registry)
}

async fn open(url: &str) -> Ws {
    tokio_tungstenite::connect_async(url).await.unwrap().0
}

async fn send(ws: &mut Ws, frame: Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

async fn recv(ws: &mut Ws) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .unwrap();
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

async fn recv_type(ws: &mut Ws, kind: &str) -> Value {
    loop {
        let frame = recv(ws).await;
        if frame["type"] == kind {
            return frame;
        }
    }
}

async fn assert_quiet(ws: &mut Ws) {
    let got = timeout(Duration::from_millis(150), ws.next()).await;
    assert!(got.is_err(), "unexpected frame: {:?}", got);
}

#[tokio::test]
async fn test_join_yields_snapshot_then_roster() {
    let (url, _registry) = start_test_server().await;
    let mut ws = open(&url).await;

    send(&mut ws, json!({"type": "join-room", "roomId": "w1", "displayName": "Alice"})).await;

    assert_eq!(
        recv(&mut ws).await,
        json!({
            "type": "room-snapshot",
            "roomId": "w1",
            "buffer": "",
            "language": "javascript",
            "users": ["Alice"],
            "languages": ["javascript", "python", "cpp", "java"]
        })
    );
    assert_eq!(
        recv(&mut ws).await,
        json!({"type": "update-users", "roomId": "w1", "users": ["Alice"]})
    );
}

#[tokio::test]
async fn test_blank_name_joins_as_guest() {
    let (url, registry) = start_test_server().await;
    let mut ws = open(&url).await;

    send(&mut ws, json!({"type": "join-room", "roomId": "w2", "displayName": "   "})).await;
    let snapshot = recv_type(&mut ws, "room-snapshot").await;
    assert_eq!(snapshot["users"], json!(["Guest"]));
    assert_eq!(registry.roster("w2").await, vec!["Guest"]);
}

#[tokio::test]
async fn test_unknown_language_rejected_without_broadcast() {
    let (url, registry) = start_test_server().await;
    let mut alice = open(&url).await;
    let mut bob = open(&url).await;

    send(&mut alice, json!({"type": "join-room", "roomId": "w3", "displayName": "Alice"})).await;
    recv_type(&mut alice, "update-users").await;
    send(&mut bob, json!({"type": "join-room", "roomId": "w3", "displayName": "Bob"})).await;
    recv_type(&mut bob, "update-users").await;
    recv_type(&mut alice, "update-users").await;

    send(&mut alice, json!({"type": "language-change", "language": "cobol", "roomId": "w3"})).await;

    let error = recv(&mut alice).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["code"], "invalid-language");
    assert_eq!(error["roomId"], "w3");
    assert_quiet(&mut bob).await;
    assert_eq!(registry.snapshot("w3").await.unwrap().language, "javascript");
}

#[tokio::test]
async fn test_malformed_frames_do_not_close_the_connection() {
    let (url, _registry) = start_test_server().await;
    let mut ws = open(&url).await;

    ws.send(Message::text("not json")).await.unwrap();
    send(&mut ws, json!({"type": "cursor-move", "roomId": "w4"})).await;
    send(&mut ws, json!({"type": "ping", "nonce": "still-here"})).await;

    let pong = recv(&mut ws).await;
    assert_eq!(pong["type"], "pong");
    assert_eq!(pong["nonce"], "still-here");
}

#[tokio::test]
async fn test_code_change_for_missing_room_is_ignored() {
    let (url, registry) = start_test_server().await;
    let mut ws = open(&url).await;

    send(&mut ws, json!({"type": "code-change", "buffer": "x", "roomId": "nowhere"})).await;
    send(&mut ws, json!({"type": "ping"})).await;

    assert_eq!(recv(&mut ws).await["type"], "pong");
    assert!(registry.snapshot("nowhere").await.is_none());
}

#[tokio::test]
async fn test_blank_room_id_is_refused() {
    let (url, registry) = start_test_server().await;
    let mut ws = open(&url).await;

    send(&mut ws, json!({"type": "join-room", "roomId": "", "displayName": "Alice"})).await;
    let error = recv(&mut ws).await;
    assert_eq!(error["code"], "invalid-room");
    assert_eq!(registry.stats().await.rooms, 0);
}
