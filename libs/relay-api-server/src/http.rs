use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use relay_store::Record;

use super::AppState;

#[derive(Serialize)]
struct Ack {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/packets
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_packets(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.inspector.packets().await)
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/events, POST /api/events
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_events(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.inspector.events().await)
}

/// Body is parsed as JSON whatever the Content-Type says.
/// Oversize bodies are rejected with 413 by the `Bytes` extractor.
pub(crate) async fn handle_append_event(
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    let record: Record = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "rejected event body");
            return (
                StatusCode::BAD_REQUEST,
                axum::Json(Ack {
                    ok: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response();
        }
    };

    state.journal.append_event(record).await;
    axum::Json(Ack {
        ok: true,
        error: None,
    })
    .into_response()
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/stats
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_stats(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.inspector.stats().await)
}

// ═══════════════════════════════════════════════════════════════
//  CORS: any origin
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn cors(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        let headers = resp.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        );
        return resp;
    }

    let mut resp = next.run(req).await;
    resp.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    resp
}
