//! End-to-end tests over a real socket.

use std::sync::Arc;
use std::time::Duration;

use chatrelay::server::{self, state::AppState};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server() -> (String, Arc<AppState>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::default());
    tokio::spawn(server::serve(
        listener,
        Arc::clone(&state),
        std::future::pending(),
    ));
    (format!("ws://{addr}/ws"), state)
}

async fn connect(url: &str) -> Client {
    let (client, _) = connect_async(url).await.unwrap();
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("read failed");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_text(client: &mut Client, text: &str) {
    let frame = json!({"type": "message", "text": text}).to_string();
    client.send(Message::Text(frame)).await.unwrap();
}

async fn wait_for_online(state: &AppState, expected: usize) {
    tokio::time::timeout(WAIT, async {
        while state.online() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("online count never settled");
}

#[tokio::test]
async fn test_join_relay_and_leave() {
    let (url, state) = start_server().await;

    let mut a = connect(&url).await;
    assert_eq!(
        next_json(&mut a).await,
        json!({"type": "system", "text": "Someone joined the chat.", "online": 1})
    );

    let mut b = connect(&url).await;
    let joined = json!({"type": "system", "text": "Someone joined the chat.", "online": 2});
    assert_eq!(next_json(&mut a).await, joined);
    assert_eq!(next_json(&mut b).await, joined);

    // The blank message is dropped, so the next frame either side sees is "hello".
    send_text(&mut a, "   ").await;
    send_text(&mut a, "hello").await;
    let hello = json!({"type": "message", "text": "hello"});
    assert_eq!(next_json(&mut b).await, hello);
    assert_eq!(next_json(&mut a).await, hello);

    a.close(None).await.unwrap();
    assert_eq!(
        next_json(&mut b).await,
        json!({"type": "system", "text": "Someone left the chat.", "online": 1})
    );
    assert_eq!(state.online(), 1);

    b.close(None).await.unwrap();
    wait_for_online(&state, 0).await;
}

#[tokio::test]
async fn test_abrupt_drop_reports_lost_connection() {
    let (url, state) = start_server().await;

    let mut a = connect(&url).await;
    next_json(&mut a).await;
    let mut b = connect(&url).await;
    next_json(&mut a).await;
    next_json(&mut b).await;

    drop(a);

    assert_eq!(
        next_json(&mut b).await,
        json!({"type": "system", "text": "A connection was lost.", "online": 1})
    );
    wait_for_online(&state, 1).await;
}
