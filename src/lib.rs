// Lodestore: embedded file-backed key-value cache with per-entry TTL

pub mod cache;
pub mod config;
pub mod logging;

pub use cache::{CacheConfig, CacheError, DiskCache, Expiry};
