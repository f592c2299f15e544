pub mod error;
pub mod journal;
pub mod ring;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub use error::StoreError;
pub use journal::EventLog;
pub use ring::{PacketRing, PACKET_CAPACITY};

/// Schema-less record as submitted by a producer or client.
pub type Record = serde_json::Value;

// ═══════════════════════════════════════════════════════════════
//  Traits consumed by the API server
// ═══════════════════════════════════════════════════════════════

/// Ingestion side: where decoded packets go.
pub trait PacketPublisher: Send + Sync {
    fn publish(&self, record: Record) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Count an inbound message that was dropped because it did not decode.
    fn reject(&self);

    fn connection_opened(&self);

    fn connection_closed(&self);
}

/// Write side of the event log.
pub trait EventJournal: Send + Sync {
    fn append_event(&self, record: Record) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Read access to both stores and the ingestion counters.
pub trait RelayInspector: Send + Sync {
    fn packets(&self) -> Pin<Box<dyn Future<Output = Vec<Record>> + Send + '_>>;

    fn events(&self) -> Pin<Box<dyn Future<Output = Vec<Record>> + Send + '_>>;

    fn stats(&self) -> Pin<Box<dyn Future<Output = RelayStats> + Send + '_>>;
}

// ═══════════════════════════════════════════════════════════════
//  RelayStats
// ═══════════════════════════════════════════════════════════════

/// Point-in-time view of the relay counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    pub packets_stored: usize,
    pub packet_capacity: usize,
    pub events_stored: usize,
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub events_received: u64,
    pub connections_active: u64,
    pub connections_total: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Relay
// ═══════════════════════════════════════════════════════════════

/// Owner of the packet ring and the event log.
///
/// One instance per process in production; tests build their own.
pub struct Relay {
    packets: PacketRing,
    events: EventLog,
    packets_received: AtomicU64,
    packets_dropped: AtomicU64,
    events_received: AtomicU64,
    connections_active: AtomicU64,
    connections_total: AtomicU64,
}

impl Relay {
    pub fn new(packet_capacity: usize) -> Result<Self, StoreError> {
        Ok(Self::with_ring(PacketRing::new(packet_capacity)?))
    }

    fn with_ring(packets: PacketRing) -> Self {
        Self {
            packets,
            events: EventLog::new(),
            packets_received: AtomicU64::new(0),
            packets_dropped: AtomicU64::new(0),
            events_received: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            connections_total: AtomicU64::new(0),
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::with_ring(PacketRing::default())
    }
}

impl PacketPublisher for Relay {
    fn publish(&self, record: Record) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.packets.append(record).await;
            self.packets_received.fetch_add(1, Ordering::Relaxed);
        })
    }

    fn reject(&self) {
        self.packets_dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn connection_opened(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    fn connection_closed(&self) {
        let prev = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        if prev.is_err() {
            tracing::warn!("connection_closed without matching connection_opened");
        }
    }
}

impl EventJournal for Relay {
    fn append_event(&self, record: Record) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.events.append(record).await;
            self.events_received.fetch_add(1, Ordering::Relaxed);
        })
    }
}

impl RelayInspector for Relay {
    fn packets(&self) -> Pin<Box<dyn Future<Output = Vec<Record>> + Send + '_>> {
        Box::pin(self.packets.snapshot())
    }

    fn events(&self) -> Pin<Box<dyn Future<Output = Vec<Record>> + Send + '_>> {
        Box::pin(self.events.snapshot())
    }

    fn stats(&self) -> Pin<Box<dyn Future<Output = RelayStats> + Send + '_>> {
        Box::pin(async move {
            RelayStats {
                packets_stored: self.packets.len().await,
                packet_capacity: self.packets.capacity(),
                events_stored: self.events.len().await,
                packets_received: self.packets_received.load(Ordering::Relaxed),
                packets_dropped: self.packets_dropped.load(Ordering::Relaxed),
                events_received: self.events_received.load(Ordering::Relaxed),
                connections_active: self.connections_active.load(Ordering::Relaxed),
                connections_total: self.connections_total.load(Ordering::Relaxed),
            }
        })
    }
}
