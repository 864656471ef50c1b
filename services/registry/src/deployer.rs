//! Deterministic instantiation capability
//!
//! The registry never creates pair instances itself. It asks a [`Deployer`]
//! (the host environment) to materialize the template at the CREATE2 address
//! and then to bind the instance to its tokens. The host must produce the same
//! address the registry derived; anything else is reported as an error.
//!
//! [`InMemoryDeployer`] simulates a host address space. It backs the CLI and
//! tests, and can inject faults and pre-occupied addresses.

use pair_types::create2::create2_address;
use pair_types::{EthAddress, Hash256, InitCode};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::debug;

use crate::store::PairRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// Something already lives at the target address
    #[error("address {0} is already occupied")]
    AddressOccupied(EthAddress),

    /// The host placed the instance somewhere other than the derived address
    #[error("instance landed at {actual}, expected {expected}")]
    AddressMismatch {
        expected: EthAddress,
        actual: EthAddress,
    },

    #[error("no instance at {0}")]
    NotInstantiated(EthAddress),

    #[error("instance at {0} is already initialized")]
    AlreadyInitialized(EthAddress),

    /// Host-specific failure
    #[error("host failure: {0}")]
    Host(String),
}

/// Host capability used by the registry to materialize pair instances
///
/// Implementations must be deterministic in `(deployer, salt, init_code.hash())`
/// and must leave no trace of an instance after [`Deployer::discard`].
pub trait Deployer: Send + Sync {
    /// Place `init_code` at its CREATE2 address under `deployer`
    fn instantiate(
        &self,
        deployer: EthAddress,
        salt: Hash256,
        init_code: &InitCode,
    ) -> Result<EthAddress, DeployError>;

    /// Bind a fresh instance to its registry and canonical tokens
    fn initialize(
        &self,
        pair: EthAddress,
        factory: EthAddress,
        token0: EthAddress,
        token1: EthAddress,
    ) -> Result<(), DeployError>;

    /// Roll back an instance whose creation was aborted
    fn discard(&self, pair: EthAddress);

    /// Whether a pair instance lives at `pair`
    fn contains(&self, pair: EthAddress) -> bool;
}

/// What `initialize` recorded on an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairBinding {
    pub factory: EthAddress,
    pub token0: EthAddress,
    pub token1: EthAddress,
}

/// A simulated pair instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairInstance {
    pub address: EthAddress,
    pub deployer: EthAddress,
    pub code_hash: Hash256,
    pub binding: Option<PairBinding>,
}

impl PairInstance {
    pub fn factory(&self) -> Option<EthAddress> {
        self.binding.map(|b| b.factory)
    }

    pub fn token0(&self) -> Option<EthAddress> {
        self.binding.map(|b| b.token0)
    }

    pub fn token1(&self) -> Option<EthAddress> {
        self.binding.map(|b| b.token1)
    }
}

/// One-shot failure for the next matching call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    FailInstantiate(String),
    FailInitialize(String),
}

/// In-process host with its own address space
#[derive(Debug, Default)]
pub struct InMemoryDeployer {
    instances: RwLock<HashMap<EthAddress, PairInstance>>,
    /// Addresses holding foreign code, never discarded
    occupied: RwLock<HashMap<EthAddress, Hash256>>,
    faults: Mutex<VecDeque<Fault>>,
}

impl InMemoryDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `address` as holding unrelated code
    pub fn occupy(&self, address: EthAddress) {
        self.occupied.write().insert(address, Hash256::ZERO);
    }

    /// Queue a failure for a later call
    pub fn inject(&self, fault: Fault) {
        self.faults.lock().push_back(fault);
    }

    pub fn instance(&self, address: EthAddress) -> Option<PairInstance> {
        self.instances.read().get(&address).cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Recreate instances for pairs restored from a snapshot
    pub fn rehydrate(&self, factory: EthAddress, init_code: &InitCode, records: &[PairRecord]) {
        let mut instances = self.instances.write();
        for record in records {
            instances.insert(
                record.pair,
                PairInstance {
                    address: record.pair,
                    deployer: factory,
                    code_hash: init_code.hash(),
                    binding: Some(PairBinding {
                        factory,
                        token0: record.token0,
                        token1: record.token1,
                    }),
                },
            );
        }
        debug!(count = records.len(), "Rehydrated pair instances");
    }

    fn take_fault(&self, matches: impl Fn(&Fault) -> bool) -> Option<Fault> {
        let mut faults = self.faults.lock();
        let position = faults.iter().position(matches)?;
        faults.remove(position)
    }
}

impl Deployer for InMemoryDeployer {
    fn instantiate(
        &self,
        deployer: EthAddress,
        salt: Hash256,
        init_code: &InitCode,
    ) -> Result<EthAddress, DeployError> {
        if let Some(Fault::FailInstantiate(reason)) =
            self.take_fault(|f| matches!(f, Fault::FailInstantiate(_)))
        {
            return Err(DeployError::Host(reason));
        }

        let address = create2_address(deployer, salt, init_code.hash());
        if self.occupied.read().contains_key(&address) {
            return Err(DeployError::AddressOccupied(address));
        }

        let mut instances = self.instances.write();
        if instances.contains_key(&address) {
            return Err(DeployError::AddressOccupied(address));
        }
        instances.insert(
            address,
            PairInstance {
                address,
                deployer,
                code_hash: init_code.hash(),
                binding: None,
            },
        );
        Ok(address)
    }

    fn initialize(
        &self,
        pair: EthAddress,
        factory: EthAddress,
        token0: EthAddress,
        token1: EthAddress,
    ) -> Result<(), DeployError> {
        if let Some(Fault::FailInitialize(reason)) =
            self.take_fault(|f| matches!(f, Fault::FailInitialize(_)))
        {
            return Err(DeployError::Host(reason));
        }

        let mut instances = self.instances.write();
        let instance = instances
            .get_mut(&pair)
            .ok_or(DeployError::NotInstantiated(pair))?;
        if instance.binding.is_some() {
            return Err(DeployError::AlreadyInitialized(pair));
        }
        instance.binding = Some(PairBinding {
            factory,
            token0,
            token1,
        });
        Ok(())
    }

    fn discard(&self, pair: EthAddress) {
        if self.instances.write().remove(&pair).is_some() {
            debug!(%pair, "Discarded aborted pair instance");
        }
    }

    fn contains(&self, pair: EthAddress) -> bool {
        self.instances.read().contains_key(&pair)
    }
}
