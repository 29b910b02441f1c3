//! Cache error types
//!
//! Every foreground operation returns these synchronously. Callers are expected
//! to branch on them: a miss (`KeyNotFound`) and a stale entry (`KeyExpired`) are
//! different outcomes from a damaged file (`CorruptEntry`) or a failing disk (`Io`).

use std::fmt;
use thiserror::Error;

/// Which part of an entry file could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    /// Plain-mode expiry line missing or not an integer
    Header,
    /// Compressed-mode gzip header, expiry field or body unreadable
    Container,
}

impl fmt::Display for CorruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptionKind::Header => write!(f, "header"),
            CorruptionKind::Container => write!(f, "container"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("key not found")]
    KeyNotFound,

    #[error("key has expired")]
    KeyExpired,

    #[error("corrupt entry ({kind}): {detail}")]
    CorruptEntry { kind: CorruptionKind, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    pub(crate) fn corrupt_header(detail: impl Into<String>) -> Self {
        CacheError::CorruptEntry {
            kind: CorruptionKind::Header,
            detail: detail.into(),
        }
    }

    pub(crate) fn corrupt_container(detail: impl Into<String>) -> Self {
        CacheError::CorruptEntry {
            kind: CorruptionKind::Container,
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotFound)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, CacheError::KeyExpired)
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, CacheError::CorruptEntry { .. })
    }

    /// Returns the corruption kind for `CorruptEntry`, None otherwise
    pub fn corruption_kind(&self) -> Option<CorruptionKind> {
        match self {
            CacheError::CorruptEntry { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
