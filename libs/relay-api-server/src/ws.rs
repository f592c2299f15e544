use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::IntoResponse;

use relay_store::{PacketPublisher, Record};

use super::AppState;
use crate::DecodeError;

// ═══════════════════════════════════════════════════════════════
//  WebSocket: / and /ws (producer ingestion)
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_ws(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.max_message_size(state.ws_message_bytes)
        .max_frame_size(state.ws_message_bytes)
        .on_upgrade(move |socket| ws_connection(socket, peer, state))
}

/// Keeps the active-connection gauge honest even if the task is aborted.
struct ConnectionGuard(Arc<dyn PacketPublisher>);

impl ConnectionGuard {
    fn open(publisher: Arc<dyn PacketPublisher>) -> Self {
        publisher.connection_opened();
        Self(publisher)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.connection_closed();
    }
}

/// Decode one inbound frame payload into a packet record.
pub(crate) fn decode_packet(payload: &[u8]) -> Result<Record, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

// ═══════════════════════════════════════════════════════════════
//  Connection handler
// ═══════════════════════════════════════════════════════════════

async fn ws_connection(mut socket: WebSocket, peer: SocketAddr, state: AppState) {
    let _guard = ConnectionGuard::open(state.publisher.clone());
    tracing::info!(%peer, "producer connected");

    loop {
        tokio::select! {
            biased;

            _ = state.shutdown.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }

            msg = socket.recv() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::warn!(%peer, error = %e, "producer connection error");
                        break;
                    }
                    None => break,
                };

                let decoded = match &msg {
                    Message::Text(t) => decode_packet(t.as_str().as_bytes()),
                    Message::Binary(b) => decode_packet(b),
                    Message::Close(_) => break,
                    // ping/pong are answered by the transport
                    _ => continue,
                };

                match decoded {
                    Ok(record) => state.publisher.publish(record).await,
                    Err(e) => {
                        state.publisher.reject();
                        tracing::warn!(%peer, error = %e, "dropping malformed packet");
                    }
                }
            }
        }
    }

    tracing::info!(%peer, "producer disconnected");
}
