//! Counters for the stream's frame and connection activity.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ClientStats {
    frames_received: AtomicU64,
    price_updates: AtomicU64,
    codec_failures: AtomicU64,
    payload_failures: AtomicU64,
    malformed_prices: AtomicU64,
    pings_answered: AtomicU64,
    reconnects: AtomicU64,
}

/// Point-in-time copy of [`ClientStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_received: u64,
    pub price_updates: u64,
    pub codec_failures: u64,
    /// Decompressed frames that were not valid market JSON.
    pub payload_failures: u64,
    pub malformed_prices: u64,
    pub pings_answered: u64,
    pub reconnects: u64,
    /// Generation of the most recently published connection; 0 before the first.
    pub generation: u64,
}

impl ClientStats {
    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_price_update(&self) {
        self.price_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_codec_failure(&self) {
        self.codec_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_payload_failure(&self) {
        self.payload_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_price(&self) {
        self.malformed_prices.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ping_answered(&self) {
        self.pings_answered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, generation: u64) -> StatsSnapshot {
        StatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            price_updates: self.price_updates.load(Ordering::Relaxed),
            codec_failures: self.codec_failures.load(Ordering::Relaxed),
            payload_failures: self.payload_failures.load(Ordering::Relaxed),
            malformed_prices: self.malformed_prices.load(Ordering::Relaxed),
            pings_answered: self.pings_answered.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            generation,
        }
    }
}
