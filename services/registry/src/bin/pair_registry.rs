//! Pair registry command-line tool
//!
//! State lives in the snapshot file named by the configuration and is loaded
//! on every invocation.
//!
//! Usage:
//!   pair_registry predict 0xA0b8...eB48 0xC02a...6Cc2
//!   pair_registry create 0xA0b8...eB48 0xC02a...6Cc2
//!   pair_registry get 0xC02a...6Cc2 0xA0b8...eB48
//!   pair_registry list --json
//!   pair_registry set-fee-to-setter --caller 0x...d3 0x...beef
//!   pair_registry --config config/registry.toml info

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pair_config::RegistryConfig;
use pair_registry::{InMemoryDeployer, PairRegistry, RegistrySnapshot};
use pair_types::EthAddress;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pair_registry")]
#[command(about = "Canonical pair registry with deterministic addresses")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive, overrides the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the address a pair would occupy
    Predict { token_a: EthAddress, token_b: EthAddress },
    /// Create the pair for two tokens
    Create { token_a: EthAddress, token_b: EthAddress },
    /// Look up an existing pair
    Get { token_a: EthAddress, token_b: EthAddress },
    /// List every pair in creation order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Transfer the administrative role
    SetFeeToSetter {
        /// Identity performing the transfer
        #[arg(long)]
        caller: EthAddress,
        new_setter: EthAddress,
    },
    /// Show registry identity, template digest and statistics
    Info,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = RegistryConfig::load(args.config.as_deref())?;
    init_logging(args.log_level.as_deref().unwrap_or(&config.log_level), args.json_logs)?;
    info!(
        registry = %config.registry_address,
        fee_to_setter = %config.fee_to_setter,
        snapshot = ?config.snapshot_path,
        "Loaded registry configuration"
    );

    let registry = open_registry(&config)?;
    let mutated = run(&registry, args.command)?;

    if mutated {
        if let Some(path) = &config.snapshot_path {
            registry
                .snapshot()
                .save(path)
                .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
        }
    }
    Ok(())
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log filter '{level}'"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Build the registry, restoring state and host instances from the snapshot
fn open_registry(config: &RegistryConfig) -> Result<PairRegistry> {
    let init_code = config.init_code()?;
    let host = Arc::new(InMemoryDeployer::new());

    let snapshot = match &config.snapshot_path {
        Some(path) => RegistrySnapshot::load(path)
            .with_context(|| format!("Failed to load snapshot from {}", path.display()))?,
        None => None,
    };

    let registry = match snapshot {
        Some(snapshot) => {
            host.rehydrate(config.registry_address, &init_code, &snapshot.pairs);
            PairRegistry::restore(config.registry_address, snapshot, init_code, host)
                .context("Snapshot does not match this registry")?
        }
        None => {
            info!("No snapshot found, starting empty");
            PairRegistry::new(
                config.registry_address,
                config.fee_to_setter,
                init_code,
                host,
            )
        }
    };
    Ok(registry)
}

/// Execute one command; returns whether state changed
fn run(registry: &PairRegistry, command: Command) -> Result<bool> {
    match command {
        Command::Predict { token_a, token_b } => {
            let pair = registry.predict_pair_address(token_a, token_b)?;
            println!("{}", pair.to_checksum());
            Ok(false)
        }
        Command::Create { token_a, token_b } => {
            let pair = registry.create_pair(token_a, token_b)?;
            println!("{}", pair.to_checksum());
            Ok(true)
        }
        Command::Get { token_a, token_b } => {
            match registry.get_pair(token_a, token_b) {
                Some(pair) => println!("{}", pair.to_checksum()),
                None => println!("none"),
            }
            Ok(false)
        }
        Command::List { json } => {
            let pairs = registry.pairs();
            if json {
                println!("{}", serde_json::to_string_pretty(&pairs)?);
            } else {
                for record in pairs {
                    println!(
                        "{:>6}  {}  {} / {}",
                        record.index,
                        record.pair.to_checksum(),
                        record.token0.to_checksum(),
                        record.token1.to_checksum()
                    );
                }
            }
            Ok(false)
        }
        Command::SetFeeToSetter { caller, new_setter } => {
            registry.set_fee_to_setter(caller, new_setter)?;
            println!("{}", new_setter.to_checksum());
            Ok(true)
        }
        Command::Info => {
            let stats = registry.stats();
            println!("registry        {}", registry.address().to_checksum());
            println!("init_code_hash  {}", registry.init_code_hash());
            println!("fee_to_setter   {}", registry.fee_to_setter().to_checksum());
            println!("pairs           {}", registry.all_pairs_length());
            println!("created         {}", stats.pairs_created);
            Ok(false)
        }
    }
}
