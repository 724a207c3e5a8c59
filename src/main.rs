//! Bookstore entitlement replay CLI
//!
//! Loads a catalog, replays a request log through the entitlement engine and
//! prints the final wallet balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --catalog catalog.csv requests.csv > wallets.csv
//! cargo run -- --catalog catalog.csv --strategy sync requests.csv > wallets.csv
//! cargo run -- --catalog catalog.csv --strategy async --batch-size 2000 --max-concurrent 8 requests.csv
//! RUST_LOG=debug cargo run -- --catalog catalog.csv --starting-balance 500 requests.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sync**: Requests are applied one by one in file order
//! - **async**: Requests of different users are applied concurrently (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, file not readable, output failure)

use bookstore_entitlements::cli;
use bookstore_entitlements::strategy;
use std::process;
use tracing::error;

fn main() {
    cli::init_tracing();

    let args = cli::parse_args();

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, args.to_engine_config(), batch_config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.catalog_file, &args.requests_file, &mut output) {
        error!(error = %e, "Replay failed");
        process::exit(1);
    }
}
