// Payload serialization for typed values using MessagePack

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CacheError;

/// Turns structured values into the opaque bytes stored in an entry
///
/// The disk cache itself only handles byte payloads; this is the seam used by
/// `DiskCache::set_value` / `get_value`.
pub trait PayloadCodec: Send + Sync {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError>;
}

/// MessagePack codec with named struct fields, so added optional fields
/// remain readable from older entries
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

impl PayloadCodec for MessagePackCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        rmp_serde::to_vec_named(value)
            .map_err(|e| CacheError::Encoding(format!("MessagePack encoding failed: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        rmp_serde::from_slice(bytes)
            .map_err(|e| CacheError::Encoding(format!("MessagePack decoding failed: {}", e)))
    }
}
