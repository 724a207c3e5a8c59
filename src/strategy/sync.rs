//! Synchronous processing strategy
//!
//! Replays the request log on the calling thread, one request at a time, in
//! file order.
//!
//! # Design
//!
//! The SyncProcessingStrategy only orchestrates, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Request handling to `BookstoreEngine`
//! - CSV output to `csv_format::write_wallets_csv`

use crate::config::EngineConfig;
use crate::core::{BookstoreEngine, InMemoryAccountStore};
use crate::io::csv_format::write_wallets_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{load_catalog, log_outcome, ProcessingStrategy};
use crate::types::BookstoreError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use bookstore_entitlements::config::EngineConfig;
/// use bookstore_entitlements::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(EngineConfig::default());
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("catalog.csv"), Path::new("requests.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy {
    config: EngineConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        catalog_path: &Path,
        requests_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), BookstoreError> {
        let catalog = Arc::new(load_catalog(catalog_path)?);
        let engine = BookstoreEngine::new(catalog, Arc::new(InMemoryAccountStore::new()), self.config);

        for record in SyncReader::new(requests_path)? {
            match record {
                Ok(request) => {
                    let result = engine.process(&request);
                    log_outcome(&request, &result);
                }
                Err(e) => warn!(error = %e, "Skipping request record"),
            }
        }

        write_wallets_csv(&engine.wallets()?, output)
    }
}
