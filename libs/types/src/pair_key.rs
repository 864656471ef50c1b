//! Canonical ordering of unordered identifier pairs
//!
//! A pair of assets has no inherent direction, so every index keyed by a pair
//! stores it as `(low, high)`. [`canonicalize`] is the only way to build a
//! [`CanonicalKey`], which makes "is this key ordered?" a type-level fact.

use crate::create2::keccak256;
use crate::errors::KeyError;
use crate::identifiers::{EthAddress, Hash256};
use serde::{Deserialize, Serialize};

/// Ordered `(token0, token1)` with `token0 < token1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalKey<T = EthAddress> {
    token0: T,
    token1: T,
}

/// Order two distinct identifiers into a [`CanonicalKey`]
///
/// `canonicalize(a, b) == canonicalize(b, a)` for every distinct `a`, `b`.
pub fn canonicalize<T: Ord>(a: T, b: T) -> Result<CanonicalKey<T>, KeyError> {
    match a.cmp(&b) {
        std::cmp::Ordering::Less => Ok(CanonicalKey { token0: a, token1: b }),
        std::cmp::Ordering::Greater => Ok(CanonicalKey { token0: b, token1: a }),
        std::cmp::Ordering::Equal => Err(KeyError::IdenticalIdentifiers),
    }
}

impl<T> CanonicalKey<T> {
    /// The lower identifier
    pub fn token0(&self) -> &T {
        &self.token0
    }

    /// The higher identifier
    pub fn token1(&self) -> &T {
        &self.token1
    }

    pub fn into_tuple(self) -> (T, T) {
        (self.token0, self.token1)
    }

    /// Whether `token` is one side of this pair
    pub fn contains(&self, token: &T) -> bool
    where
        T: PartialEq,
    {
        &self.token0 == token || &self.token1 == token
    }
}

impl CanonicalKey<EthAddress> {
    /// CREATE2 salt: `keccak256(abi.encodePacked(token0, token1))`
    pub fn salt(&self) -> Hash256 {
        let mut packed = [0u8; 40];
        packed[..20].copy_from_slice(self.token0.as_bytes());
        packed[20..].copy_from_slice(self.token1.as_bytes());
        keccak256(&packed)
    }
}

impl std::fmt::Display for CanonicalKey<EthAddress> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_both_directions() {
        let x = EthAddress::from_low_u64(2);
        let y = EthAddress::from_low_u64(1);

        let forward = canonicalize(x, y).unwrap();
        let reverse = canonicalize(y, x).unwrap();

        assert_eq!(forward, reverse);
        assert_eq!(*forward.token0(), y);
        assert_eq!(*forward.token1(), x);
    }

    #[test]
    fn test_rejects_identical() {
        let x = EthAddress::from_low_u64(7);
        assert_eq!(canonicalize(x, x), Err(KeyError::IdenticalIdentifiers));
    }

    #[test]
    fn test_generic_over_ordered_types() {
        let key = canonicalize("weth", "usdc").unwrap();
        assert_eq!(key.into_tuple(), ("usdc", "weth"));

        let numeric = canonicalize(10u64, 3u64).unwrap();
        assert!(numeric.contains(&10));
        assert!(!numeric.contains(&4));
    }

    #[test]
    fn test_salt_is_packed_keccak() {
        let key = canonicalize(EthAddress::from_low_u64(1), EthAddress::from_low_u64(2)).unwrap();

        let mut packed = Vec::with_capacity(40);
        packed.extend_from_slice(EthAddress::from_low_u64(1).as_bytes());
        packed.extend_from_slice(EthAddress::from_low_u64(2).as_bytes());

        assert_eq!(key.salt(), keccak256(&packed));
    }
}
