//! # Pair Registry Service
//!
//! Keeps exactly one pair instance per unordered token combination and places
//! every instance at an address anyone can compute in advance.
//!
//! ## Architecture
//!
//! ```text
//! create_pair(a, b)
//!     │
//!     ├─ canonicalize ──────────── (token0, token1), rejects a == b
//!     │
//!     ├─ ┌──────────── state write lock ─────────────┐
//!     │  │ store.exists?  → PairAlreadyExists        │
//!     │  │ derive CREATE2 address                    │
//!     │  │ Deployer::instantiate + initialize        │
//!     │  │   (failure → discard, InstantiationFailed)│
//!     │  │ store.insert   → sequence index           │
//!     │  └──────────── downgrade to read ────────────┘
//!     │
//!     └─ publish PairCreated ───── subscribers (commit order)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pair_registry::{InMemoryDeployer, PairRegistry};
//! use pair_types::{EthAddress, InitCode};
//! use std::sync::Arc;
//!
//! let registry = PairRegistry::new(
//!     EthAddress::from_low_u64(0xfac7),
//!     EthAddress::from_low_u64(0xd3),
//!     InitCode::new(vec![0x60, 0x80]),
//!     Arc::new(InMemoryDeployer::new()),
//! );
//!
//! let x = EthAddress::from_low_u64(1);
//! let y = EthAddress::from_low_u64(2);
//! let pair = registry.create_pair(x, y).unwrap();
//! assert_eq!(registry.get_pair(y, x), Some(pair));
//! assert_eq!(registry.all_pairs_length(), 1);
//! ```

pub mod admin;
pub mod deployer;
pub mod error;
pub mod events;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use admin::AdminRole;
pub use deployer::{DeployError, Deployer, Fault, InMemoryDeployer, PairBinding, PairInstance};
pub use error::{RegistryError, Result};
pub use events::{EventBus, PairCreated, RegistryEvent};
pub use registry::{PairRegistry, RegistryStats};
pub use snapshot::{RegistrySnapshot, SnapshotError};
pub use store::{PairRecord, PairStore};
