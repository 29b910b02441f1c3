//! Disk-based cache with per-entry expiry
//!
//! Each key maps to one file named after the SHA-256 of the key, holding the
//! expiry timestamp and the payload (plain or gzip-compressed). Expired entries
//! are rejected on read and removed by an optional background janitor.

pub use self::disk_cache::DiskCache;
pub use self::types::{Expiry, StorageMode, SweepReport};

// Public for callers supplying their own filesystem backend
pub mod backend;
pub mod codec;
mod disk_cache;
mod janitor;
pub mod tokio_backend;
mod types;
pub mod utils;

#[cfg(test)]
mod mock_backend;
