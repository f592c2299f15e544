#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("store: {0}")]
    Store(#[from] relay_store::StoreError),

    #[error("{0}")]
    Api(#[from] relay_api_server::ApiError),

    #[error("api task: {0}")]
    ApiTask(#[source] tokio::task::JoinError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
