use tokio::sync::RwLock;

use crate::Record;

/// Append-only log of events, oldest first.
///
/// Unbounded: memory grows with every accepted event until the process exits.
#[derive(Default)]
pub struct EventLog {
    records: RwLock<Vec<Record>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, record: Record) {
        self.records.write().await.push(record);
    }

    /// Owned copy of every event appended so far.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
