#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("packet ring capacity must be > 0")]
    ZeroCapacity,
}
