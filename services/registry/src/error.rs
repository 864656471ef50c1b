//! Registry error types
//!
//! Every variant is returned synchronously to the caller and none of them
//! leave partial state behind.

use crate::deployer::DeployError;
use crate::snapshot::SnapshotError;
use pair_types::{EthAddress, KeyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Both tokens are the same identifier
    #[error("identical identifiers: {0}")]
    IdenticalIdentifiers(EthAddress),

    /// The lower token of the pair is the zero address
    #[error("zero address cannot be paired")]
    ZeroAddress,

    /// A pair for this unordered combination already exists
    #[error("pair already exists for {token0}/{token1} at {pair}")]
    PairAlreadyExists {
        token0: EthAddress,
        token1: EthAddress,
        pair: EthAddress,
    },

    /// The host could not materialize or initialize the pair instance
    #[error("instantiation failed at {address}: {source}")]
    InstantiationFailed {
        address: EthAddress,
        #[source]
        source: DeployError,
    },

    /// Caller does not hold the administrative role
    #[error("caller {caller} is not the fee-to setter")]
    Unauthorized { caller: EthAddress },

    /// Discovery list position past the end
    #[error("index {index} out of range for {length} pairs")]
    IndexOutOfRange { index: u64, length: u64 },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl RegistryError {
    /// Map a key-construction failure for the given input token
    pub(crate) fn from_key(err: KeyError, token: EthAddress) -> Self {
        match err {
            KeyError::IdenticalIdentifiers => RegistryError::IdenticalIdentifiers(token),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
