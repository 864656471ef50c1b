//! Pair Registry
//!
//! Orchestrates pair creation: canonicalize the tokens, reject duplicates,
//! derive the CREATE2 address, have the host instantiate and initialize the
//! pair, then record it. The whole sequence runs under the state write lock,
//! so two creators racing on the same tokens can never both succeed and no
//! reader ever sees a pair whose instance does not exist. The lock is then
//! downgraded and held for reading while the event goes out, which keeps
//! notifications in commit order.

use crate::admin::AdminRole;
use crate::deployer::{DeployError, Deployer};
use crate::error::{RegistryError, Result};
use crate::events::{EventBus, PairCreated, RegistryEvent};
use crate::snapshot::{RegistrySnapshot, SnapshotError};
use crate::store::{PairRecord, PairStore};
use crossbeam_channel::Receiver;
use pair_types::create2::{self, derive_pair_address};
use pair_types::{canonicalize, EthAddress, Hash256, InitCode};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything mutable, guarded by one lock
#[derive(Debug)]
struct RegistryState {
    store: PairStore,
    admin: AdminRole,
}

/// Counters since process start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub pairs_created: u64,
    pub duplicate_rejections: u64,
    pub instantiation_failures: u64,
    pub unauthorized_attempts: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    pairs_created: AtomicU64,
    duplicate_rejections: AtomicU64,
    instantiation_failures: AtomicU64,
    unauthorized_attempts: AtomicU64,
}

pub struct PairRegistry {
    address: EthAddress,
    init_code: InitCode,
    deployer: Arc<dyn Deployer>,
    state: RwLock<RegistryState>,
    events: EventBus,
    stats: StatCounters,
}

impl std::fmt::Debug for PairRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairRegistry")
            .field("address", &self.address)
            .field("init_code", &self.init_code)
            .field("pairs", &self.all_pairs_length())
            .finish()
    }
}

impl PairRegistry {
    /// Empty registry at `address`, administered by `fee_to_setter`
    pub fn new(
        address: EthAddress,
        fee_to_setter: EthAddress,
        init_code: InitCode,
        deployer: Arc<dyn Deployer>,
    ) -> Self {
        info!(
            registry = %address,
            %fee_to_setter,
            init_code_hash = %init_code.hash(),
            "Pair registry initialized"
        );
        Self {
            address,
            init_code,
            deployer,
            state: RwLock::new(RegistryState {
                store: PairStore::new(),
                admin: AdminRole::new(fee_to_setter),
            }),
            events: EventBus::new(),
            stats: StatCounters::default(),
        }
    }

    /// Rebuild a registry from a validated snapshot
    ///
    /// The host behind `deployer` must already hold the snapshot's instances;
    /// a record without one is rejected as inconsistent.
    pub fn restore(
        address: EthAddress,
        snapshot: RegistrySnapshot,
        init_code: InitCode,
        deployer: Arc<dyn Deployer>,
    ) -> Result<Self> {
        snapshot.validate(address, init_code.hash())?;

        let mut store = PairStore::new();
        for record in &snapshot.pairs {
            if !deployer.contains(record.pair) {
                return Err(SnapshotError::Inconsistent {
                    index: record.index,
                    reason: format!("no instance at {} on the host", record.pair),
                }
                .into());
            }
            let key = canonicalize(record.token0, record.token1)
                .map_err(|e| RegistryError::from_key(e, record.token0))?;
            store.insert(key, record.pair)?;
        }
        info!(
            registry = %address,
            pairs = store.count(),
            fee_to_setter = %snapshot.fee_to_setter,
            "Pair registry restored from snapshot"
        );

        Ok(Self {
            address,
            init_code,
            deployer,
            state: RwLock::new(RegistryState {
                store,
                admin: AdminRole::new(snapshot.fee_to_setter),
            }),
            events: EventBus::new(),
            stats: StatCounters::default(),
        })
    }

    /// Create the pair for two tokens given in any order
    pub fn create_pair(&self, token_a: EthAddress, token_b: EthAddress) -> Result<EthAddress> {
        let key = canonicalize(token_a, token_b).map_err(|e| RegistryError::from_key(e, token_a))?;
        let (token0, token1) = (*key.token0(), *key.token1());
        if token0.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }

        let mut state = self.state.write();

        if let Some(existing) = state.store.lookup(&key) {
            self.stats.duplicate_rejections.fetch_add(1, Ordering::Relaxed);
            warn!(%token0, %token1, pair = %existing, "Pair already exists");
            return Err(RegistryError::PairAlreadyExists {
                token0,
                token1,
                pair: existing,
            });
        }

        let salt = key.salt();
        let expected = derive_pair_address(self.address, &key, self.init_code.hash());
        let pair = self
            .deployer
            .instantiate(self.address, salt, &self.init_code)
            .map_err(|source| self.instantiation_failed(expected, source))?;

        if pair != expected {
            self.deployer.discard(pair);
            return Err(self.instantiation_failed(
                expected,
                DeployError::AddressMismatch {
                    expected,
                    actual: pair,
                },
            ));
        }

        if let Err(source) = self.deployer.initialize(pair, self.address, token0, token1) {
            self.deployer.discard(pair);
            return Err(self.instantiation_failed(pair, source));
        }

        let index = state.store.insert(key, pair)?;
        let created = PairCreated {
            token0,
            token1,
            pair,
            index,
            pair_count: index + 1,
        };

        // Readers may see the pair now; the next writer waits until the
        // event is out, so subscribers observe commits in order.
        let _state = RwLockWriteGuard::downgrade(state);
        self.stats.pairs_created.fetch_add(1, Ordering::Relaxed);
        info!(
            token0 = %created.token0,
            token1 = %created.token1,
            pair = %created.pair,
            index = created.index,
            "Pair created"
        );
        self.events.publish(RegistryEvent::PairCreated(created));
        Ok(created.pair)
    }

    fn instantiation_failed(&self, address: EthAddress, source: DeployError) -> RegistryError {
        self.stats
            .instantiation_failures
            .fetch_add(1, Ordering::Relaxed);
        error!(%address, error = %source, "Pair instantiation failed, creation rolled back");
        RegistryError::InstantiationFailed { address, source }
    }

    /// Pair for two tokens in any order, `None` if absent or identical
    pub fn get_pair(&self, token_a: EthAddress, token_b: EthAddress) -> Option<EthAddress> {
        let key = canonicalize(token_a, token_b).ok()?;
        self.state.read().store.lookup(&key)
    }

    pub fn pair_exists(&self, token_a: EthAddress, token_b: EthAddress) -> bool {
        canonicalize(token_a, token_b)
            .map(|key| self.state.read().store.exists(&key))
            .unwrap_or(false)
    }

    /// Pair address at `index` in the discovery list
    pub fn all_pairs(&self, index: u64) -> Result<EthAddress> {
        self.pair_record(index).map(|record| record.pair)
    }

    pub fn pair_record(&self, index: u64) -> Result<PairRecord> {
        self.state.read().store.by_index(index)
    }

    /// Ordered copy of every record
    pub fn pairs(&self) -> Vec<PairRecord> {
        self.state.read().store.records().to_vec()
    }

    pub fn all_pairs_length(&self) -> u64 {
        self.state.read().store.count()
    }

    pub fn fee_to_setter(&self) -> EthAddress {
        self.state.read().admin.holder()
    }

    /// Hand the administrative role to `new_setter`
    pub fn set_fee_to_setter(&self, caller: EthAddress, new_setter: EthAddress) -> Result<()> {
        let mut state = self.state.write();
        let previous = match state.admin.transfer(caller, new_setter) {
            Ok(previous) => previous,
            Err(err) => {
                self.stats
                    .unauthorized_attempts
                    .fetch_add(1, Ordering::Relaxed);
                warn!(%caller, "Unauthorized fee-to setter change rejected");
                return Err(err);
            }
        };

        let _state = RwLockWriteGuard::downgrade(state);
        info!(%previous, current = %new_setter, "Fee-to setter changed");
        self.events.publish(RegistryEvent::FeeToSetterChanged {
            previous,
            current: new_setter,
        });
        Ok(())
    }

    /// Address a pair would occupy, whether or not it exists yet
    pub fn predict_pair_address(
        &self,
        token_a: EthAddress,
        token_b: EthAddress,
    ) -> Result<EthAddress> {
        create2::predict_pair_address(self.address, self.init_code.hash(), token_a, token_b)
            .map_err(|e| RegistryError::from_key(e, token_a))
    }

    pub fn address(&self) -> EthAddress {
        self.address
    }

    pub fn init_code_hash(&self) -> Hash256 {
        self.init_code.hash()
    }

    pub fn subscribe(&self) -> Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            pairs_created: self.stats.pairs_created.load(Ordering::Relaxed),
            duplicate_rejections: self.stats.duplicate_rejections.load(Ordering::Relaxed),
            instantiation_failures: self.stats.instantiation_failures.load(Ordering::Relaxed),
            unauthorized_attempts: self.stats.unauthorized_attempts.load(Ordering::Relaxed),
        }
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            registry: self.address,
            init_code_hash: self.init_code.hash(),
            fee_to_setter: state.admin.holder(),
            pairs: state.store.records().to_vec(),
        }
    }
}
