//! Live building-list updates over WebSocket.
//!
//! A client receives the current building list right after connecting,
//! every broadcast after that, and the hub's heartbeat. Sending the text
//! `availabilityUpdated` asks the server to broadcast a fresh list to all
//! clients.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, instrument};

use super::AppState;

/// Client message that triggers an immediate broadcast.
pub const AVAILABILITY_UPDATED: &str = "availabilityUpdated";

/// `GET /ws`
#[instrument(skip_all)]
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut client = state.availability.connect_client().await;
    let client_id = client.id;

    let (mut sender, mut receiver) = socket.split();

    let forward_task = tokio::spawn(async move {
        while let Some(message) = client.rx.recv().await {
            if sender
                .send(Message::Text(message.as_ref().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(incoming) = receiver.next().await {
        match incoming {
            Ok(Message::Text(text)) if text.as_str() == AVAILABILITY_UPDATED => {
                state.availability.broadcast_buildings().await;
            }
            Ok(Message::Text(text)) => {
                debug!(client_id = %client_id, message = %text.as_str(), "Ignoring client message");
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "WebSocket receive failed");
                break;
            }
        }
    }

    forward_task.abort();
    state.availability.hub().unregister(client_id).await;
}
