#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("connect {url}: {source}")]
    Connect {
        url: String,
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("input: {0}")]
    Io(#[from] std::io::Error),

    #[error("send: {0}")]
    Send(String),
}
