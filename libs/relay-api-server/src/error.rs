#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bind api {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("axum serve: {0}")]
    Serve(#[source] std::io::Error),
}

/// An inbound ingestion frame that is not well-formed JSON.
#[derive(Debug, thiserror::Error)]
#[error("decode: {0}")]
pub struct DecodeError(#[from] serde_json::Error);
