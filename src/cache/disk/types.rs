//! Type definitions for disk cache

use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// On-disk representation, fixed for the lifetime of a cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// `<expiry>\n<payload>`
    Plain,
    /// gzip member with the expiry in the header's extra field
    Compressed,
}

impl StorageMode {
    pub fn from_compression(use_compression: bool) -> Self {
        if use_compression {
            StorageMode::Compressed
        } else {
            StorageMode::Plain
        }
    }

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            StorageMode::Plain => "cache",
            StorageMode::Compressed => "gzip",
        }
    }
}

/// When an entry stops being readable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Relative to the moment of the write
    Ttl(Duration),
    /// Absolute Unix timestamp in seconds
    At(i64),
}

impl Expiry {
    /// Resolve to an absolute Unix timestamp
    ///
    /// TTLs round up to the next whole second so an entry is readable for at
    /// least its full TTL despite the second-resolution storage format.
    pub fn resolve(&self, now: SystemTime) -> i64 {
        match self {
            Expiry::At(ts) => *ts,
            Expiry::Ttl(ttl) => {
                let deadline = now
                    .checked_add(*ttl)
                    .unwrap_or(now)
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default();
                let secs = deadline.as_secs() + u64::from(deadline.subsec_nanos() > 0);
                i64::try_from(secs).unwrap_or(i64::MAX)
            }
        }
    }
}

impl From<Duration> for Expiry {
    fn from(ttl: Duration) -> Self {
        Expiry::Ttl(ttl)
    }
}

/// Sub-second instants round up to the next whole second, matching [`Expiry::Ttl`]
impl From<SystemTime> for Expiry {
    fn from(at: SystemTime) -> Self {
        let secs = match at.duration_since(UNIX_EPOCH) {
            Ok(d) => {
                let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
                i64::try_from(secs).unwrap_or(i64::MAX)
            }
            // Truncating a negative offset toward zero is already the ceiling
            Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
        };
        Expiry::At(secs)
    }
}

/// Current Unix time in whole seconds
pub fn unix_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        Err(_) => 0,
    }
}

/// An entry is expired once its timestamp is at or before `now`
pub fn is_expired(expires_at: i64, now: i64) -> bool {
    expires_at <= now
}

/// Outcome of one janitor sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Entry files found with this cache's extension
    pub scanned: usize,
    /// Expired entries deleted
    pub removed: usize,
    /// Entries that could not be decoded and were left in place
    pub corrupt: usize,
    /// Entries whose read or removal failed
    pub failed: usize,
}
