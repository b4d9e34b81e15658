use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use uuid::Uuid;

use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn stream_spikes(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !authorize(&state.config, &headers) {
        return HttpError::Unauthorized.into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, mut socket: WebSocket) {
    let client_id = Uuid::new_v4().to_string();
    let mut notices = state.spike_stream.register(&client_id).await;
    debug!("spike stream client {} connected", client_id);

    loop {
        tokio::select! {
            notice = notices.recv() => {
                let Some(notice) = notice else { break };
                let text = match serde_json::to_string(&notice) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!("failed to encode spike notice: {}", err);
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                // Clients have nothing to say; any inbound frame other than
                // a close keeps the connection alive.
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.spike_stream.unregister(&client_id).await;
    debug!("spike stream client {} disconnected", client_id);
}
