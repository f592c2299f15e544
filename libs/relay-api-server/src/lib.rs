pub mod error;
mod http;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use relay_store::{EventJournal, PacketPublisher, RelayInspector};

pub use error::{ApiError, DecodeError};

/// Size limits applied at the HTTP and WebSocket boundary.
#[derive(Debug, Clone, Copy)]
pub struct ApiLimits {
    /// Max body of `POST /api/events`.
    pub event_body_bytes: usize,
    /// Max size of one inbound WebSocket message (and frame).
    pub ws_message_bytes: usize,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            event_body_bytes: 100 * 1024,
            ws_message_bytes: 1024 * 1024,
        }
    }
}

#[derive(Clone)]
struct AppState {
    publisher: Arc<dyn PacketPublisher>,
    journal: Arc<dyn EventJournal>,
    inspector: Arc<dyn RelayInspector>,
    ws_message_bytes: usize,
    shutdown: CancellationToken,
}

/// Build the relay router: WebSocket ingestion on `/` and `/ws`,
/// query endpoints under `/api`.
///
/// `shutdown` also ends every open ingestion connection.
pub fn router<R>(relay: Arc<R>, limits: ApiLimits, shutdown: CancellationToken) -> Router
where
    R: PacketPublisher + EventJournal + RelayInspector + 'static,
{
    let state = AppState {
        publisher: relay.clone(),
        journal: relay.clone(),
        inspector: relay,
        ws_message_bytes: limits.ws_message_bytes,
        shutdown,
    };

    Router::new()
        .route("/", get(ws::handle_ws))
        .route("/ws", get(ws::handle_ws))
        .route("/api/packets", get(http::handle_list_packets))
        .route(
            "/api/events",
            get(http::handle_list_events)
                .post(http::handle_append_event)
                .layer(DefaultBodyLimit::max(limits.event_body_bytes)),
        )
        .route("/api/stats", get(http::handle_stats))
        .layer(middleware::from_fn(http::cors))
        .with_state(state)
}

/// Serve `app` on an already bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), ApiError> {
    if let Ok(local) = listener.local_addr() {
        tracing::info!(addr = %local, "api server (http+ws) listening");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.cancelled_owned())
    .await
    .map_err(ApiError::Serve)
}

/// Bind `addr:port` and run the relay API until `shutdown` fires.
pub async fn run<R>(
    addr: &str,
    port: u16,
    relay: Arc<R>,
    limits: ApiLimits,
    shutdown: CancellationToken,
) -> Result<(), ApiError>
where
    R: PacketPublisher + EventJournal + RelayInspector + 'static,
{
    let bind_addr = format!("{addr}:{port}");
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: bind_addr,
            source,
        })?;

    let app = router(relay, limits, shutdown.clone());
    serve(listener, app, shutdown).await
}
