//! Processing strategy module for request replay
//!
//! A strategy is a complete replay pipeline: load the catalog, stream the
//! request log through the engine and write the final wallet balances. The
//! synchronous and concurrent implementations are selected at runtime.

use crate::cli::StrategyType;
use crate::config::EngineConfig;
use crate::core::InMemoryCatalog;
use crate::io::read_catalog;
use crate::types::{BookstoreError, Request, RequestOutcome};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay a request log against a catalog and write the resulting wallets
    ///
    /// # Arguments
    ///
    /// * `catalog_path` - CSV file with the books and their prices
    /// * `requests_path` - CSV file with the requests to replay
    /// * `output` - Writer receiving the `user,balance` CSV
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be opened or the output cannot
    /// be written. Malformed rows and rejected requests are logged and
    /// skipped; they never abort the replay.
    fn process(
        &self,
        catalog_path: &Path,
        requests_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), BookstoreError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Sync or Async
/// * `engine_config` - Starting balance and rental terms
/// * `batch_config` - Optional batch configuration (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    engine_config: EngineConfig,
    batch_config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(engine_config)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            engine_config,
            batch_config.unwrap_or_default(),
        )),
    }
}

/// Build an in-memory catalog from a catalog CSV
///
/// Rows whose book ID was already loaded are logged and skipped.
pub fn load_catalog(path: &Path) -> Result<InMemoryCatalog, BookstoreError> {
    let catalog = InMemoryCatalog::new();

    for (book, price) in read_catalog(path)? {
        let id = book.id;
        if let Err(e) = catalog.import_book(book, price) {
            warn!(book = id, error = %e, "Skipping catalog entry");
        }
    }

    Ok(catalog)
}

/// Log the outcome of one replayed request
pub(crate) fn log_outcome(request: &Request, result: &Result<RequestOutcome, BookstoreError>) {
    match result {
        Ok(outcome) => debug!(user = request.user, ?outcome, "Request applied"),
        Err(e) => warn!(user = request.user, kind = ?request.kind, error = %e, "Request rejected"),
    }
}
