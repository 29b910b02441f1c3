//! Cache module
//!
//! - [`config`] - construction settings
//! - [`disk`] - the file-backed cache engine, entry codec and janitor
//! - [`error`] - error taxonomy returned by every operation
//! - [`lock`] - per-key read/write lock registry
//! - [`payload`] - typed value serialization
//! - [`stats`] - operation counters

pub mod config;
pub mod disk;
pub mod error;
pub mod lock;
pub mod payload;
pub mod stats;

pub use config::CacheConfig;
pub use disk::{DiskCache, Expiry, StorageMode, SweepReport};
pub use error::{CacheError, CorruptionKind};
pub use lock::KeyLockRegistry;
pub use payload::{MessagePackCodec, PayloadCodec};
pub use stats::CacheStats;
