//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `book`: Catalog types (books, prices, catalog patches)
//! - `wallet`: User wallet balance
//! - `transaction`: Purchase/rental tiers and ledger transactions
//! - `entitlement`: Derived access status and feed projections
//! - `request`: Replayable engine requests and their outcomes
//! - `error`: Error types for the entitlement engine

pub mod book;
pub mod entitlement;
pub mod error;
pub mod request;
pub mod transaction;
pub mod wallet;

pub use book::{Amount, Book, BookId, BookPatch, CatalogPage, NewBook, Price};
pub use entitlement::{EntitlementStatus, FeedEntry, FeedFilter, FeedPage, PageAccess};
pub use error::{BookstoreError, ContentError, Entity, UnavailableReason};
pub use request::{Request, RequestKind, RequestOutcome};
pub use transaction::{Tier, Transaction};
pub use wallet::{UserId, Wallet};
