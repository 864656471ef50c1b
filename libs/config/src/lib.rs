//! # Pair Registry Configuration
//!
//! Centralized configuration loading and defaults for the pair registry
//! service.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in development defaults ([`defaults`])
//! 2. A TOML file (`config/registry.toml` unless a path is given)
//! 3. `PAIR_REGISTRY_*` environment variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pair_config::RegistryConfig;
//!
//! let config = RegistryConfig::load(None)?;
//! let init_code = config.init_code()?;
//! println!("template digest {}", init_code.hash());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod registry_config;

pub use registry_config::{load_config, RegistryConfig};
