//! Default configuration values
//!
//! Development values only. Production deployments set the registry
//! identity, admin holder and template explicitly.

use pair_types::EthAddress;

/// Config file consulted when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/registry.toml";

/// Environment variable prefix for overrides (`PAIR_REGISTRY_LOG_LEVEL`, ...)
pub const ENV_PREFIX: &str = "PAIR_REGISTRY";

/// Development registry identity
pub const DEV_REGISTRY_ADDRESS: EthAddress = EthAddress::from_low_u64(0xfac7);

/// Development admin holder (the "deployer")
pub const DEV_FEE_TO_SETTER: EthAddress = EthAddress::from_low_u64(0xd3);

/// Development pair template
pub const DEV_INIT_CODE_HEX: &str = "0x608060405234801561001057600080fd5b50";

/// Default snapshot location
pub const DEFAULT_SNAPSHOT_PATH: &str = "./data/registry.snapshot";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted by `log_level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
