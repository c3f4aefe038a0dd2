//! WebSocket handler for the chat room.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::relay::{Broadcaster, Connection, DisconnectReason};
use crate::server::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, receiver) = socket.split();
    let (connection, mut outbox) = Connection::open();
    let member = state.relay.connect(connection);

    // Drain this connection's outbox into the socket. Ends when a write fails.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            // axum 0.7 `Message::Text` owns a `String`; the queued frame
            // stays shared, the copy is made only at write time.
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
    });

    let relay = state.relay.clone();
    let mut recv_task = tokio::spawn(read_frames(receiver, relay));

    // Wait for either task to complete
    let reason = tokio::select! {
        res = &mut recv_task => {
            send_task.abort();
            res.unwrap_or(DisconnectReason::Lost)
        },
        _ = &mut send_task => {
            recv_task.abort();
            DisconnectReason::Lost
        },
    };

    state.relay.disconnect(member, reason);
    tracing::debug!(?reason, "WebSocket connection closed");
}

/// Relays every inbound text frame until the client goes away.
async fn read_frames(mut receiver: SplitStream<WebSocket>, relay: Broadcaster) -> DisconnectReason {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                relay.relay(&text);
            }
            Ok(Message::Close(_)) => return DisconnectReason::Closed,
            Ok(Message::Binary(data)) => {
                tracing::debug!(len = data.len(), "Ignoring binary frame");
            }
            // Pong is handled automatically by axum
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                tracing::debug!(?e, "WebSocket read failed");
                return DisconnectReason::Lost;
            }
        }
    }
    DisconnectReason::Closed
}
