//! Batch processing with user-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which replays batches of
//! requests concurrently while keeping each user's requests in order.
//!
//! # Design
//!
//! A batch is split into one sub-batch per user. Each sub-batch runs as its
//! own tokio task and processes its requests sequentially. Requests of
//! different users never touch the same wallet or ledger, so their relative
//! order does not change the outcome.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── BookstoreEngine  (shared stores, cloned into every task)
//! ```

use std::collections::HashMap;

use crate::core::engine::BookstoreEngine;
use crate::core::traits::{AccountStore, CatalogStore};
use crate::types::{BookstoreError, Request, RequestOutcome, UserId};
use tracing::error;

/// Result of processing a single request
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The request that was processed
    pub request: Request,

    /// The outcome (success or rejection)
    pub result: Result<RequestOutcome, BookstoreError>,
}

/// Batch processor with user-based partitioning
pub struct BatchProcessor<C, A> {
    engine: BookstoreEngine<C, A>,
}

impl<C, A> Clone for BatchProcessor<C, A> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<C, A> BatchProcessor<C, A>
where
    C: CatalogStore + 'static,
    A: AccountStore + 'static,
{
    pub fn new(engine: BookstoreEngine<C, A>) -> Self {
        Self { engine }
    }

    /// Partition a batch of requests by user
    ///
    /// # Guarantees
    ///
    /// - Each request appears in exactly one sub-batch
    /// - Requests of each user keep their original order
    pub fn partition_by_user(&self, batch: Vec<Request>) -> HashMap<UserId, Vec<Request>> {
        let mut user_batches: HashMap<UserId, Vec<Request>> = HashMap::new();

        for request in batch {
            user_batches.entry(request.user).or_default().push(request);
        }

        user_batches
    }

    /// Process every request of one user in order
    ///
    /// Rejected requests are captured in the results and do not stop the
    /// remaining ones.
    pub async fn process_user_requests(&self, requests: Vec<Request>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let result = self.engine.process(&request);
            results.push(ProcessingResult { request, result });
        }

        results
    }

    /// Process a batch with one task per user
    ///
    /// Results of different users may come back in any order.
    pub async fn process_batch(&self, batch: Vec<Request>) -> Vec<ProcessingResult> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (_user, requests) in user_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_user_requests(requests).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => error!(error = %e, "Request task panicked"),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core::{InMemoryAccountStore, InMemoryCatalog};
    use crate::types::{NewBook, Price, RequestKind};
    use std::sync::Arc;

    fn processor() -> BatchProcessor<InMemoryCatalog, InMemoryAccountStore> {
        let catalog = Arc::new(InMemoryCatalog::new());
        let book = catalog.create_book(NewBook::default());
        let mut price = Price::zeroed(book.id);
        price.buy = Some(400);
        catalog.set_price(book.id, price).unwrap();

        BatchProcessor::new(BookstoreEngine::new(
            catalog,
            Arc::new(InMemoryAccountStore::new()),
            EngineConfig::default(),
        ))
    }

    fn register(user: UserId) -> Request {
        Request {
            user,
            kind: RequestKind::Register,
            at: None,
        }
    }

    fn buy(user: UserId) -> Request {
        Request {
            user,
            kind: RequestKind::Execute {
                book: 1,
                action: "buy".to_string(),
            },
            at: None,
        }
    }

    #[test]
    fn test_partition_by_user_empty_batch() {
        assert!(processor().partition_by_user(vec![]).is_empty());
    }

    #[test]
    fn test_partition_by_user_keeps_order() {
        let batch = vec![register(1), register(2), buy(1), buy(3), buy(2)];

        let partitioned = processor().partition_by_user(batch);

        assert_eq!(partitioned.len(), 3);
        assert_eq!(partitioned[&1], vec![register(1), buy(1)]);
        assert_eq!(partitioned[&2], vec![register(2), buy(2)]);
        assert_eq!(partitioned[&3], vec![buy(3)]);
    }

    #[tokio::test]
    async fn test_process_user_requests_continues_after_rejection() {
        let processor = processor();

        let results = processor
            .process_user_requests(vec![buy(1), register(1), buy(1), buy(1)])
            .await;

        let ok: Vec<bool> = results.iter().map(|r| r.result.is_ok()).collect();
        assert_eq!(ok, vec![false, true, true, false]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_many_users() {
        let processor = processor();
        let mut batch = Vec::new();
        for user in 1..=50 {
            batch.push(register(user));
            batch.push(buy(user));
            batch.push(buy(user));
        }

        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 150);
        assert_eq!(results.iter().filter(|r| r.result.is_err()).count(), 50);

        let wallets = processor.engine.wallets().unwrap();
        assert_eq!(wallets.len(), 50);
        assert!(wallets.iter().all(|wallet| wallet.balance == 600));
    }
}
