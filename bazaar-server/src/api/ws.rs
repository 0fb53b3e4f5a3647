use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// `GET /ws` - client message stream.
///
/// Upgrades the HTTP connection to a WebSocket and pushes every message
/// handed to the delivery sink as a JSON text frame, e.g.
/// `{"notification": {...}}` or `{"status": "publishing"}`. Messages sent
/// before the client connected are not replayed.
pub(super) async fn client_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_client_ws(socket, state))
}

/// Background task that drives a single WebSocket connection.
async fn handle_client_ws(mut socket: WebSocket, state: AppState) {
    let mut deliveries = state.deliveries.subscribe();
    tracing::debug!("WS: client connected");

    loop {
        tokio::select! {
            result = deliveries.recv() => {
                match result {
                    Ok(frame) => {
                        if socket.send(Message::Text(frame.into())).await.is_err() {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "WS: client lagged, messages dropped");
                    }
                    Err(RecvError::Closed) => {
                        break;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                        tracing::debug!("WS: client disconnected");
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}
