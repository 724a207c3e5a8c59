//! Asynchronous batch processing strategy
//!
//! Replays the request log in batches on a multi-threaded tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (user partitioning + tasks)
//!         └── BookstoreEngine
//!             ├── InMemoryCatalog
//!             └── InMemoryAccountStore
//! ```
//!
//! Batches are processed one after another, so a user whose requests span
//! several batches still sees them applied in file order. Within a batch,
//! different users run in parallel.

use crate::config::EngineConfig;
use crate::core::{BatchProcessor, BookstoreEngine, InMemoryAccountStore};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_wallets_csv;
use crate::strategy::{load_catalog, log_outcome, ProcessingStrategy};
use crate::types::BookstoreError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of requests per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "Invalid concurrency, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    engine_config: EngineConfig,
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(engine_config: EngineConfig, config: BatchConfig) -> Self {
        Self {
            engine_config,
            config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        catalog_path: &Path,
        requests_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), BookstoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()?;

        runtime.block_on(async {
            let catalog = Arc::new(load_catalog(catalog_path)?);
            let engine = BookstoreEngine::new(
                catalog,
                Arc::new(InMemoryAccountStore::new()),
                self.engine_config,
            );
            let processor = BatchProcessor::new(engine.clone());

            let file = tokio::fs::File::open(requests_path).await.map_err(|e| {
                match e.kind() {
                    std::io::ErrorKind::NotFound => BookstoreError::FileNotFound {
                        path: requests_path.display().to_string(),
                    },
                    _ => BookstoreError::from(e),
                }
            })?;

            // csv-async reads futures::io, tokio files need the compat layer
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for processed in processor.process_batch(batch).await {
                    log_outcome(&processed.request, &processed.result);
                }
            }

            write_wallets_csv(&engine.wallets()?, output)
        })
    }
}
