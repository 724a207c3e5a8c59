//! Bookstore Entitlement & Transaction Engine
//!
//! # Overview
//!
//! This library decides whether a user may read a book and records the
//! purchases and rentals that grant that right, debiting the user's wallet
//! exactly once per committed transaction.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (books, prices, wallets, transactions, statuses)
//! - [`config`] - Starting balance and rental terms
//! - [`core`] - Business logic components:
//!   - [`core::resolver`] - Entitlement status derivation
//!   - [`core::orchestrator`] - Purchase and rental commits
//!   - [`core::feed`] - Per-user catalog listing
//!   - [`core::gate`] - Page read authorization
//!   - [`core::engine`] - Facade over all of the above
//! - [`io`] - CSV handling for the replay CLI
//! - [`strategy`] - Sequential and concurrent replay pipelines
//! - [`cli`] - CLI arguments parsing
//!
//! # Entitlement Statuses
//!
//! - **free**: buy price is zero and the book is visible
//! - **buy**: bought permanently
//! - **rent_2week** / **rent_month** / **rent_3month**: active rental
//! - **rent_expired**: every rental has run out
//! - **none**: never bought or rented
//!
//! Rentals last 14, 30 and 90 days and stop granting access exactly at
//! `date_buy + duration`.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use config::{EngineConfig, RentalTerms};
pub use crate::core::{
    AccountStore, BookstoreEngine, CatalogStore, Clock, ContentReader, InMemoryAccountStore,
    InMemoryCatalog, ManualClock, SystemClock,
};
pub use io::write_wallets_csv;
pub use types::{
    Amount, Book, BookId, BookstoreError, CatalogPage, EntitlementStatus, FeedEntry, FeedFilter,
    FeedPage, PageAccess, Price, Tier, Transaction, UserId, Wallet,
};
