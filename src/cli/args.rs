use crate::config::EngineConfig;
use crate::strategy::BatchConfig;
use crate::types::Amount;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay bookstore requests against a catalog and print wallet balances
#[derive(Parser, Debug)]
#[command(name = "bookstore-entitlements")]
#[command(about = "Replay bookstore purchase, rental and read requests", long_about = None)]
pub struct CliArgs {
    /// Request log CSV file path
    #[arg(value_name = "REQUESTS", help = "Path to the request log CSV file")]
    pub requests_file: PathBuf,

    /// Catalog CSV file path
    #[arg(
        long = "catalog",
        value_name = "CATALOG",
        help = "Path to the catalog CSV file (books and prices)"
    )]
    pub catalog_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent per-user replay"
    )]
    pub strategy: StrategyType,

    /// Number of requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Balance of newly registered wallets
    #[arg(
        long = "starting-balance",
        value_name = "AMOUNT",
        help = "Balance of newly registered wallets (default: 1000)"
    )]
    pub starting_balance: Option<Amount>,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Unset values fall back to the defaults; zero values are rejected by
    /// `BatchConfig::new` in favour of the defaults.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create the engine configuration from CLI arguments
    pub fn to_engine_config(&self) -> EngineConfig {
        self.starting_balance
            .map(EngineConfig::with_starting_balance)
            .unwrap_or_default()
    }
}
