//! # Pair Registry Types
//!
//! Pure building blocks shared by the registry service and by anyone who wants
//! to reason about pairs without talking to a registry.
//!
//! ## Contents
//!
//! - **Identifiers**: [`EthAddress`] and [`Hash256`] fixed-width byte wrappers
//! - **Canonical keys**: [`canonicalize`] orders two distinct identifiers into a
//!   [`CanonicalKey`] so `(a, b)` and `(b, a)` name the same pair
//! - **Address derivation**: [`create2`] computes the EIP-1014 address a pair
//!   instance will occupy, bit-exact with the EVM `CREATE2` opcode
//!
//! ## Usage
//!
//! ```rust
//! use pair_types::{create2, EthAddress, InitCode};
//!
//! let factory: EthAddress = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f".parse().unwrap();
//! let usdc: EthAddress = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap();
//! let weth: EthAddress = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".parse().unwrap();
//! let code = InitCode::new(vec![0x60, 0x80, 0x60, 0x40]);
//!
//! // Argument order never matters
//! let a = create2::predict_pair_address(factory, code.hash(), usdc, weth).unwrap();
//! let b = create2::predict_pair_address(factory, code.hash(), weth, usdc).unwrap();
//! assert_eq!(a, b);
//! ```

pub mod create2;
pub mod errors;
pub mod identifiers;
pub mod pair_key;

pub use create2::{keccak256, InitCode};
pub use errors::{AddressParseError, KeyError};
pub use identifiers::{EthAddress, Hash256};
pub use pair_key::{canonicalize, CanonicalKey};

#[doc(hidden)]
pub use hex as __hex;
#[doc(hidden)]
pub use serde as __serde;
