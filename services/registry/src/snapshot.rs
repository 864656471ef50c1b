//! Registry snapshots
//!
//! Layout on disk:
//!
//! ```text
//! ┌───────────┬──────────────┬───────────────┬─────────────────────┐
//! │ "PRSN" 4B │ version u32  │ crc32 u32     │ bincode body        │
//! │           │ little-endian│ of body, LE   │ (RegistrySnapshot)  │
//! └───────────┴──────────────┴───────────────┴─────────────────────┘
//! ```
//!
//! A snapshot is only trusted after [`RegistrySnapshot::validate`]: every stored
//! address must re-derive bit-exactly from the registry identity, the template
//! digest and the canonical key.

use crate::store::PairRecord;
use pair_types::create2::derive_pair_address;
use pair_types::{canonicalize, EthAddress, Hash256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"PRSN";
pub const SNAPSHOT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("bad snapshot magic {found:02x?}")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported snapshot version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("checksum mismatch: header {expected:#010x}, body {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] bincode::Error),

    #[error("snapshot belongs to registry {found}, not {expected}")]
    RegistryMismatch {
        expected: EthAddress,
        found: EthAddress,
    },

    #[error("snapshot template {found} does not match {expected}")]
    TemplateMismatch { expected: Hash256, found: Hash256 },

    #[error("inconsistent record {index}: {reason}")]
    Inconsistent { index: u64, reason: String },

    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Full registry state at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub registry: EthAddress,
    pub init_code_hash: Hash256,
    pub fee_to_setter: EthAddress,
    /// Discovery list in creation order
    pub pairs: Vec<PairRecord>,
}

impl RegistrySnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let body = bincode::serialize(self).map_err(SnapshotError::Encode)?;
        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(&SNAPSHOT_MAGIC);
        out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        out.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parse and integrity-check the framing; contents are not validated
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Truncated { len: bytes.len() });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic { found: magic });
        }

        let version = read_u32(&bytes[4..8]);
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let expected = read_u32(&bytes[8..12]);
        let body = &bytes[HEADER_LEN..];
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(SnapshotError::ChecksumMismatch { expected, actual });
        }

        bincode::deserialize(body).map_err(SnapshotError::Decode)
    }

    /// Write to `path` through a temporary sibling, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.encode()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), pairs = self.pairs.len(), bytes = bytes.len(), "Saved registry snapshot");
        Ok(())
    }

    /// Read from `path`; `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = Self::decode(&bytes)?;
        debug!(path = %path.display(), pairs = snapshot.pairs.len(), "Loaded registry snapshot");
        Ok(Some(snapshot))
    }

    /// Check the snapshot could have been produced by this registry and template
    pub fn validate(&self, registry: EthAddress, init_code_hash: Hash256) -> Result<(), SnapshotError> {
        if self.registry != registry {
            return Err(SnapshotError::RegistryMismatch {
                expected: registry,
                found: self.registry,
            });
        }
        if self.init_code_hash != init_code_hash {
            return Err(SnapshotError::TemplateMismatch {
                expected: init_code_hash,
                found: self.init_code_hash,
            });
        }

        let mut seen = HashSet::with_capacity(self.pairs.len());
        for (position, record) in self.pairs.iter().enumerate() {
            let position = position as u64;
            let inconsistent = |reason: String| SnapshotError::Inconsistent {
                index: position,
                reason,
            };

            if record.index != position {
                return Err(inconsistent(format!("stored index {}", record.index)));
            }
            let key = canonicalize(record.token0, record.token1)
                .map_err(|e| inconsistent(e.to_string()))?;
            if *key.token0() != record.token0 {
                return Err(inconsistent("tokens not in canonical order".to_string()));
            }
            if record.token0.is_zero() {
                return Err(inconsistent("zero address token".to_string()));
            }
            let derived = derive_pair_address(registry, &key, init_code_hash);
            if derived != record.pair {
                return Err(inconsistent(format!(
                    "address {} does not derive (expected {})",
                    record.pair, derived
                )));
            }
            if !seen.insert(key) {
                return Err(inconsistent(format!("duplicate pair {key}")));
            }
        }
        Ok(())
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}
