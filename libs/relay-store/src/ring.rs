use std::collections::VecDeque;

use tokio::sync::RwLock;

use crate::{Record, StoreError};

/// Default number of packets retained by the ring.
pub const PACKET_CAPACITY: usize = 1000;

// ═══════════════════════════════════════════════════════════════
//  PacketRing
// ═══════════════════════════════════════════════════════════════

/// Fixed-capacity, insertion-ordered window of the most recent packets.
///
/// Every append and snapshot goes through the same lock, so an append is
/// never observed half-applied. Once full, each append evicts exactly the
/// single oldest packet.
pub struct PacketRing {
    records: RwLock<VecDeque<Record>>,
    capacity: usize,
}

impl PacketRing {
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        Ok(Self {
            records: RwLock::new(VecDeque::with_capacity(capacity.min(65536))),
            capacity,
        })
    }

    /// Append as newest; drops the oldest packet when at capacity.
    pub async fn append(&self, record: Record) {
        let mut buf = self.records.write().await;
        if buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(record);
    }

    /// Owned copy of the window, oldest first.
    pub async fn snapshot(&self) -> Vec<Record> {
        let buf = self.records.read().await;
        buf.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PacketRing {
    fn default() -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(PACKET_CAPACITY)),
            capacity: PACKET_CAPACITY,
        }
    }
}
