//! Pair Registry Store
//!
//! Canonical key → pair address index plus the append-only discovery list.
//! Insertion is the only mutation; records are never updated or removed.

use crate::error::{RegistryError, Result};
use pair_types::{CanonicalKey, EthAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One created pair, immutable once stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub token0: EthAddress,
    pub token1: EthAddress,
    pub pair: EthAddress,
    /// 0-based position in the discovery list
    pub index: u64,
}

/// In-memory pair index
///
/// Not synchronized; [`crate::PairRegistry`] owns it behind its state lock.
#[derive(Debug, Default)]
pub struct PairStore {
    /// Canonical key -> position in `records`
    by_key: HashMap<CanonicalKey, u64>,
    /// Discovery list in creation order
    records: Vec<PairRecord>,
}

impl PairStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, key: &CanonicalKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn lookup(&self, key: &CanonicalKey) -> Option<EthAddress> {
        self.by_key
            .get(key)
            .map(|&index| self.records[index as usize].pair)
    }

    /// Append a record for `key`, returning its sequence index
    pub fn insert(&mut self, key: CanonicalKey, pair: EthAddress) -> Result<u64> {
        if let Some(existing) = self.lookup(&key) {
            return Err(RegistryError::PairAlreadyExists {
                token0: *key.token0(),
                token1: *key.token1(),
                pair: existing,
            });
        }

        let index = self.records.len() as u64;
        self.records.push(PairRecord {
            token0: *key.token0(),
            token1: *key.token1(),
            pair,
            index,
        });
        self.by_key.insert(key, index);
        Ok(index)
    }

    pub fn count(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn by_index(&self, index: u64) -> Result<PairRecord> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.records.get(i))
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                length: self.count(),
            })
    }

    /// Records in creation order
    pub fn records(&self) -> &[PairRecord] {
        &self.records
    }
}
