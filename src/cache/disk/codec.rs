//! Entry file encoding
//!
//! Plain entries are `<decimal unix expiry>\n<payload bytes>`.
//!
//! Compressed entries are a single gzip member. The expiry lives in the gzip
//! header's FEXTRA field as subfield `LX` holding an 8-byte big-endian i64, so it
//! can be checked before the body is inflated. MTIME is also set when the expiry
//! fits in 32 bits, but only for the benefit of external tools; it is never read.

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::io::{Read, Write};

use super::types::{is_expired, StorageMode};
use crate::cache::error::CacheError;

const EXPIRY_SUBFIELD_ID: [u8; 2] = [b'L', b'X'];
const EXPIRY_LEN: usize = 8;

/// Bytes from the start of an entry file that always contain its expiry
///
/// A plain header is at most 21 bytes (`i64::MIN` plus the newline); a gzip
/// header with the expiry subfield is 24.
pub const HEADER_READ_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct EntryCodec {
    mode: StorageMode,
    level: u32,
}

impl EntryCodec {
    pub fn new(mode: StorageMode, level: u32) -> Self {
        Self { mode, level }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Serialize an entry into the full file contents
    pub fn encode(&self, expires_at: i64, payload: &[u8]) -> Result<Vec<u8>, CacheError> {
        match self.mode {
            StorageMode::Plain => Ok(encode_plain(expires_at, payload)),
            StorageMode::Compressed => encode_compressed(expires_at, payload, self.level),
        }
    }

    /// Decode file contents, rejecting entries that expired at or before `now`
    pub fn decode(&self, data: Bytes, now: i64) -> Result<Bytes, CacheError> {
        match self.mode {
            StorageMode::Plain => decode_plain(data, now),
            StorageMode::Compressed => decode_compressed(&data, now),
        }
    }

    /// Read only the expiry timestamp, without touching the payload
    ///
    /// `data` may be just the first [`HEADER_READ_LIMIT`] bytes of the file.
    pub fn read_expiry(&self, data: &[u8]) -> Result<i64, CacheError> {
        match self.mode {
            StorageMode::Plain => plain_header(data).map(|(expires_at, _)| expires_at),
            StorageMode::Compressed => compressed_header(&GzDecoder::new(data)),
        }
    }
}

fn encode_plain(expires_at: i64, payload: &[u8]) -> Vec<u8> {
    let header = format!("{}\n", expires_at);
    let mut out = Vec::with_capacity(header.len() + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Parse the expiry line, returning it with the payload offset
fn plain_header(data: &[u8]) -> Result<(i64, usize), CacheError> {
    let newline = data
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| CacheError::corrupt_header("missing expiry line terminator"))?;
    let line = std::str::from_utf8(&data[..newline])
        .map_err(|e| CacheError::corrupt_header(format!("expiry line is not UTF-8: {}", e)))?;
    let expires_at = line
        .parse::<i64>()
        .map_err(|e| CacheError::corrupt_header(format!("invalid expiry {:?}: {}", line, e)))?;
    Ok((expires_at, newline + 1))
}

fn decode_plain(data: Bytes, now: i64) -> Result<Bytes, CacheError> {
    let (expires_at, offset) = plain_header(&data)?;
    if is_expired(expires_at, now) {
        return Err(CacheError::KeyExpired);
    }
    Ok(data.slice(offset..))
}

fn encode_compressed(expires_at: i64, payload: &[u8], level: u32) -> Result<Vec<u8>, CacheError> {
    let mut extra = Vec::with_capacity(4 + EXPIRY_LEN);
    extra.extend_from_slice(&EXPIRY_SUBFIELD_ID);
    extra.extend_from_slice(&(EXPIRY_LEN as u16).to_le_bytes());
    extra.extend_from_slice(&expires_at.to_be_bytes());

    let mtime = u32::try_from(expires_at).unwrap_or(0);
    let mut encoder = GzBuilder::new()
        .extra(extra)
        .mtime(mtime)
        .write(Vec::new(), Compression::new(level));
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

fn compressed_header<R: Read>(decoder: &GzDecoder<R>) -> Result<i64, CacheError> {
    let header = decoder
        .header()
        .ok_or_else(|| CacheError::corrupt_container("invalid gzip header"))?;
    let extra = header
        .extra()
        .ok_or_else(|| CacheError::corrupt_container("gzip header has no extra field"))?;
    find_expiry(extra).ok_or_else(|| CacheError::corrupt_container("expiry subfield missing"))
}

/// Walk the FEXTRA subfields (id: 2 bytes, len: u16 LE, data) looking for the expiry
fn find_expiry(extra: &[u8]) -> Option<i64> {
    let mut rest = extra;
    while rest.len() >= 4 {
        let len = u16::from_le_bytes([rest[2], rest[3]]) as usize;
        let data = rest.get(4..4 + len)?;
        if rest[..2] == EXPIRY_SUBFIELD_ID && len == EXPIRY_LEN {
            let mut raw = [0u8; EXPIRY_LEN];
            raw.copy_from_slice(data);
            return Some(i64::from_be_bytes(raw));
        }
        rest = &rest[4 + len..];
    }
    None
}

fn decode_compressed(data: &[u8], now: i64) -> Result<Bytes, CacheError> {
    let mut decoder = GzDecoder::new(data);
    let expires_at = compressed_header(&decoder)?;
    if is_expired(expires_at, now) {
        return Err(CacheError::KeyExpired);
    }

    let mut payload = Vec::new();
    decoder
        .read_to_end(&mut payload)
        .map_err(|e| CacheError::corrupt_container(format!("inflate failed: {}", e)))?;
    Ok(Bytes::from(payload))
}
