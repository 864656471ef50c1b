//! # Deterministic Pair Addresses (EIP-1014)
//!
//! A pair instance lives at
//!
//! ```text
//! keccak256(0xff ++ registry ++ salt ++ keccak256(init_code))[12..]
//! ```
//!
//! where `salt = keccak256(token0 ++ token1)` over the canonical key. All three
//! inputs are public, so anyone can compute a pair's address before it exists
//! and without asking the registry. The registry uses the same functions when
//! it creates the pair, which keeps prediction and creation bit-identical.

use crate::errors::KeyError;
use crate::identifiers::{EthAddress, Hash256};
use crate::pair_key::{canonicalize, CanonicalKey};
use sha3::{Digest, Keccak256};
use std::sync::Arc;

/// CREATE2 domain prefix byte
pub const CREATE2_PREFIX: u8 = 0xff;

/// Keccak-256 (the pre-standard variant Ethereum uses, not SHA3-256)
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash256(hasher.finalize().into())
}

/// Immutable instantiation template with its digest computed once
///
/// Clones share the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct InitCode {
    code: Arc<[u8]>,
    hash: Hash256,
}

impl InitCode {
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        let code: Arc<[u8]> = code.into().into();
        let hash = keccak256(&code);
        Self { code, hash }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.code
    }

    /// `keccak256(init_code)`, the template's contribution to every address
    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl std::fmt::Debug for InitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitCode")
            .field("len", &self.code.len())
            .field("hash", &self.hash)
            .finish()
    }
}

/// Raw CREATE2 address from a deployer, salt and init-code digest
pub fn create2_address(deployer: EthAddress, salt: Hash256, init_code_hash: Hash256) -> EthAddress {
    let mut preimage = [0u8; 85];
    preimage[0] = CREATE2_PREFIX;
    preimage[1..21].copy_from_slice(deployer.as_bytes());
    preimage[21..53].copy_from_slice(salt.as_bytes());
    preimage[53..85].copy_from_slice(init_code_hash.as_bytes());

    let digest = keccak256(&preimage);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest.0[12..]);
    EthAddress(address)
}

/// Address of the pair for an already canonical key
pub fn derive_pair_address(
    registry: EthAddress,
    key: &CanonicalKey<EthAddress>,
    init_code_hash: Hash256,
) -> EthAddress {
    create2_address(registry, key.salt(), init_code_hash)
}

/// Address of the pair for two tokens in any order
///
/// Fails only when `token_a == token_b`. Touches no registry state.
pub fn predict_pair_address(
    registry: EthAddress,
    init_code_hash: Hash256,
    token_a: EthAddress,
    token_b: EthAddress,
) -> Result<EthAddress, KeyError> {
    let key = canonicalize(token_a, token_b)?;
    Ok(derive_pair_address(registry, &key, init_code_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> EthAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            keccak256(&[]).to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_eip1014_example_zero() {
        // Example 0 from EIP-1014: zero deployer, zero salt, init_code 0x00
        let code = InitCode::new(vec![0x00]);
        let result = create2_address(EthAddress::ZERO, Hash256::ZERO, code.hash());
        assert_eq!(result, addr("0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38"));
        assert_eq!(result.to_checksum(), "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38");
    }

    #[test]
    fn test_uniswap_v2_mainnet_pair() {
        let factory = addr("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
        let init_code_hash: Hash256 =
            "0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"
                .parse()
                .unwrap();
        let usdc = addr("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        let weth = addr("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

        let pair = predict_pair_address(factory, init_code_hash, weth, usdc).unwrap();
        assert_eq!(pair.to_checksum(), "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");
    }

    #[test]
    fn test_each_input_moves_the_address() {
        let code = InitCode::new(b"pair".to_vec());
        let other_code = InitCode::new(b"pair-v2".to_vec());
        let registry = EthAddress::from_low_u64(0xfac);
        let key = canonicalize(EthAddress::from_low_u64(1), EthAddress::from_low_u64(2)).unwrap();
        let other_key =
            canonicalize(EthAddress::from_low_u64(1), EthAddress::from_low_u64(3)).unwrap();

        let base = derive_pair_address(registry, &key, code.hash());
        assert_ne!(base, derive_pair_address(EthAddress::from_low_u64(0xfad), &key, code.hash()));
        assert_ne!(base, derive_pair_address(registry, &other_key, code.hash()));
        assert_ne!(base, derive_pair_address(registry, &key, other_code.hash()));
        assert_eq!(base, derive_pair_address(registry, &key, code.hash()));
    }

    #[test]
    fn test_predict_rejects_identical_tokens() {
        let t = EthAddress::from_low_u64(5);
        assert_eq!(
            predict_pair_address(EthAddress::ZERO, Hash256::ZERO, t, t),
            Err(KeyError::IdenticalIdentifiers)
        );
    }

    #[test]
    fn test_init_code_clone_shares_digest() {
        let code = InitCode::new(vec![1, 2, 3]);
        let copy = code.clone();
        assert_eq!(copy.hash(), keccak256(&[1, 2, 3]));
        assert_eq!(copy.bytes(), code.bytes());
        assert_eq!(code.len(), 3);
    }
}
