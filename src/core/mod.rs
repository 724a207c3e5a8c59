//! Core business logic module
//!
//! This module contains the entitlement and transaction components:
//! - `traits` - Store and content reader abstractions
//! - `clock` - Injectable time source
//! - `catalog` / `account_store` - Thread-safe in-memory stores
//! - `resolver` - Entitlement status derivation
//! - `orchestrator` - Purchase and rental commits
//! - `feed` - Feed status projection and listing
//! - `gate` - Content access checks
//! - `engine` - Facade tying the components together
//! - `batch_processor` - Concurrent replay partitioned by user

pub mod account_store;
pub mod batch_processor;
pub mod catalog;
pub mod clock;
pub mod engine;
pub mod feed;
pub mod gate;
pub mod orchestrator;
pub mod resolver;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use catalog::InMemoryCatalog;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::BookstoreEngine;
pub use feed::{project_feed_entry, FeedProjector};
pub use gate::ContentAccessGate;
pub use orchestrator::PurchaseOrchestrator;
pub use resolver::{derive_status, ledger_status, EntitlementResolver};
pub use traits::{AccountStore, CatalogStore, ContentReader};
