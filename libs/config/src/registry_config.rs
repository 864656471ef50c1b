//! Registry Configuration Module
//!
//! Loads the registry's identity, admin holder, pair template and persistence
//! settings from TOML with environment overrides.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat, Source};
use pair_types::{EthAddress, InitCode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main registry configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// The registry's own identity, mixed into every derived pair address
    pub registry_address: EthAddress,

    /// Initial holder of the administrative role
    pub fee_to_setter: EthAddress,

    /// Pair template as hex
    pub init_code: Option<String>,

    /// File containing the pair template as hex text, wins over `init_code`
    pub init_code_path: Option<PathBuf>,

    /// Where registry state is persisted between runs
    ///
    /// An empty string disables persistence (in memory only).
    #[serde(
        serialize_with = "serialize_optional_path",
        deserialize_with = "deserialize_optional_path"
    )]
    pub snapshot_path: Option<PathBuf>,

    /// Level or `EnvFilter` directive for logging
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_address: defaults::DEV_REGISTRY_ADDRESS,
            fee_to_setter: defaults::DEV_FEE_TO_SETTER,
            init_code: Some(defaults::DEV_INIT_CODE_HEX.to_string()),
            init_code_path: None,
            snapshot_path: Some(PathBuf::from(defaults::DEFAULT_SNAPSHOT_PATH)),
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from file with environment overrides
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(defaults::DEFAULT_CONFIG_PATH).required(false),
        };
        Self::assemble(file, Self::environment())
    }

    /// Parse configuration from TOML text, still honouring environment overrides
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::assemble(File::from_str(text, FileFormat::Toml), Self::environment())
    }

    fn assemble<S>(file: S, env: Environment) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        let mut loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        loaded.expand_env_vars()?;
        loaded.validate()?;

        // Runs before the binary installs its subscriber
        debug!(
            registry = %loaded.registry_address,
            fee_to_setter = %loaded.fee_to_setter,
            "Loaded registry configuration"
        );
        Ok(loaded)
    }

    /// `PAIR_REGISTRY_<FIELD>` overrides; keys are flat, so no nesting separator
    fn environment() -> Environment {
        Environment::with_prefix(defaults::ENV_PREFIX)
    }

    /// Expand `$VARS` and `~` in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(path) = &self.snapshot_path {
            self.snapshot_path = Some(expand_path(path).context("Failed to expand snapshot_path")?);
        }
        if let Some(path) = &self.init_code_path {
            self.init_code_path =
                Some(expand_path(path).context("Failed to expand init_code_path")?);
        }
        Ok(())
    }

    /// Reject configurations the registry cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.registry_address.is_zero() {
            bail!("registry_address must not be the zero address");
        }
        if self.init_code.is_none() && self.init_code_path.is_none() {
            bail!("one of init_code or init_code_path must be set");
        }
        let level = self.log_level.trim().to_ascii_lowercase();
        if !defaults::LOG_LEVELS.contains(&level.as_str()) && !level.contains('=') {
            bail!(
                "log_level '{}' is not one of {:?} or a filter directive",
                self.log_level,
                defaults::LOG_LEVELS
            );
        }
        Ok(())
    }

    /// Resolve the pair template from `init_code_path` or inline hex
    pub fn init_code(&self) -> Result<InitCode> {
        let text = match (&self.init_code_path, &self.init_code) {
            (None, Some(inline)) => inline.clone(),
            (Some(path), _) => {
                debug!(path = %path.display(), "Reading init code");
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read init code from {}", path.display()))?
            }
            (None, None) => bail!("one of init_code or init_code_path must be set"),
        };

        let trimmed = text.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).context("init code is not valid hex")?;
        if bytes.is_empty() {
            bail!("init code must not be empty");
        }
        Ok(InitCode::new(bytes))
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn serialize_optional_path<S: Serializer>(
    path: &Option<PathBuf>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match path {
        Some(p) => serializer.serialize_str(&p.to_string_lossy()),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_optional_path<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<PathBuf>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from))
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    RegistryConfig::load(path)
}
