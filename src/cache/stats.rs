//! Cache statistics types
//!
//! - `CacheStats`: point-in-time snapshot returned to callers
//! - `CacheStatsTracker`: lock-free counters updated by the engine and janitor

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Successful reads
    pub hits: u64,
    /// Reads of keys with no entry file
    pub misses: u64,
    /// Reads that found an entry past its expiry
    pub expired: u64,
    /// Reads or sweep checks that found an undecodable entry
    pub corrupt: u64,
    /// Successful writes
    pub writes: u64,
    /// Explicit deletes that removed a file
    pub deletes: u64,
    /// Completed janitor sweeps
    pub sweeps: u64,
    /// Sweep requests dropped because another sweep was running
    pub sweeps_skipped: u64,
    /// Entries removed by sweeps
    pub swept_entries: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / all reads)
    /// Returns 0.0 if there are no reads
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expired + self.corrupt;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Statistics tracker using atomics for thread safety
#[derive(Debug, Default)]
pub(crate) struct CacheStatsTracker {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    corrupt: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    sweeps: AtomicU64,
    sweeps_skipped: AtomicU64,
    swept_entries: AtomicU64,
}

impl CacheStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_corrupt(&self) {
        self.corrupt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_writes(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sweeps_skipped(&self) {
        self.sweeps_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, removed: u64) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries.fetch_add(removed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            sweeps_skipped: self.sweeps_skipped.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
        }
    }
}
