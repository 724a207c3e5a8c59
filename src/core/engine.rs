//! Bookstore entitlement engine
//!
//! This module provides the `BookstoreEngine`, the single entry point through
//! which callers register users, buy and rent books, list their feed and read
//! content.
//!
//! # Architecture
//!
//! ```text
//! BookstoreEngine
//!     ├── EntitlementResolver   (status derivation, read only)
//!     ├── PurchaseOrchestrator  (the only writer of wallets and ledger)
//!     ├── FeedProjector         (listing built on the resolver)
//!     ├── ContentAccessGate     (page reads built on the resolver)
//!     └── Arc<dyn Clock>        (source of "now" for the plain methods)
//! ```
//!
//! Every time-dependent operation comes in two forms: `op_at(.., now)` takes
//! the instant explicitly, `op(..)` reads it from the engine's clock.
//!
//! # Thread Safety
//!
//! The engine is cheap to clone; clones share the same stores and clock and
//! can be used from any number of threads or tasks.

use crate::config::EngineConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::core::feed::{self, FeedProjector};
use crate::core::gate::ContentAccessGate;
use crate::core::orchestrator::PurchaseOrchestrator;
use crate::core::resolver::EntitlementResolver;
use crate::core::traits::{AccountStore, CatalogStore, ContentReader};
use crate::types::{
    Book, BookId, BookstoreError, EntitlementStatus, FeedEntry, FeedFilter, FeedPage, PageAccess,
    Price, Request, RequestKind, RequestOutcome, Transaction, UserId, Wallet,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Entitlement and transaction engine
pub struct BookstoreEngine<C, A> {
    resolver: EntitlementResolver<C, A>,
    orchestrator: PurchaseOrchestrator<C, A>,
    feed: FeedProjector<C, A>,
    gate: ContentAccessGate<C, A>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<C, A> Clone for BookstoreEngine<C, A> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            orchestrator: self.orchestrator.clone(),
            feed: self.feed.clone(),
            gate: self.gate.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<C: CatalogStore, A: AccountStore> BookstoreEngine<C, A> {
    /// Create an engine over the given stores using the system clock
    pub fn new(catalog: Arc<C>, accounts: Arc<A>, config: EngineConfig) -> Self {
        Self::with_clock(catalog, accounts, Arc::new(SystemClock), config)
    }

    /// Create an engine with an explicit clock
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog store shared with the caller
    /// * `accounts` - Wallet and ledger store shared with the caller
    /// * `clock` - Source of the current instant
    /// * `config` - Starting balance and rental terms
    pub fn with_clock(
        catalog: Arc<C>,
        accounts: Arc<A>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let terms = config.rental_terms;
        let resolver = EntitlementResolver::new(Arc::clone(&catalog), Arc::clone(&accounts), terms);

        Self {
            orchestrator: PurchaseOrchestrator::new(catalog, accounts, terms),
            feed: FeedProjector::new(resolver.clone()),
            gate: ContentAccessGate::new(resolver.clone()),
            resolver,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        self.resolver.catalog()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Open the user's wallet with the configured starting balance
    ///
    /// Registering again returns the existing wallet unchanged.
    pub fn register(&self, user: UserId) -> Result<Wallet, BookstoreError> {
        self.resolver
            .accounts()
            .open_wallet(user, self.config.starting_balance)
    }

    /// Get a user's wallet
    pub fn wallet(&self, user: UserId) -> Result<Wallet, BookstoreError> {
        self.resolver.accounts().get_wallet(user)
    }

    /// A user's wallet and full ledger, read together
    pub fn account(&self, user: UserId) -> Result<(Wallet, Vec<Transaction>), BookstoreError> {
        self.resolver.accounts().account_snapshot(user)
    }

    /// Snapshot of every wallet
    pub fn wallets(&self) -> Result<Vec<Wallet>, BookstoreError> {
        self.resolver.accounts().wallets()
    }

    /// Prices of a book
    ///
    /// # Errors
    ///
    /// - `NotFound(Price)` if the book has no price record
    pub fn price_of(&self, book: BookId) -> Result<Price, BookstoreError> {
        self.catalog().get_price(book)
    }

    pub fn resolve_entitlement(
        &self,
        user: UserId,
        book: BookId,
    ) -> Result<EntitlementStatus, BookstoreError> {
        self.resolve_entitlement_at(user, book, self.now())
    }

    /// The user's entitlement status for a book at `now`
    ///
    /// # Errors
    ///
    /// - `NotFound(Book)` if the book does not exist
    pub fn resolve_entitlement_at(
        &self,
        user: UserId,
        book: BookId,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, BookstoreError> {
        self.resolver.resolve_at(user, book, now)
    }

    pub fn is_accessible(&self, user: UserId, book: BookId) -> Result<bool, BookstoreError> {
        self.is_accessible_at(user, book, self.now())
    }

    pub fn is_accessible_at(
        &self,
        user: UserId,
        book: BookId,
        now: DateTime<Utc>,
    ) -> Result<bool, BookstoreError> {
        self.resolver.is_accessible_at(user, book, now)
    }

    pub fn execute(
        &self,
        user: UserId,
        book: BookId,
        action: &str,
    ) -> Result<Transaction, BookstoreError> {
        self.execute_at(user, book, action, self.now())
    }

    /// Buy or rent a book; see [`PurchaseOrchestrator::execute_at`]
    pub fn execute_at(
        &self,
        user: UserId,
        book: BookId,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, BookstoreError> {
        self.orchestrator.execute_at(user, book, action, now)
    }

    pub fn project_feed_entry(
        &self,
        book: Book,
        price: Price,
        user: UserId,
    ) -> Result<FeedEntry, BookstoreError> {
        self.project_feed_entry_at(book, price, user, self.now())
    }

    /// Resolve the user's status for a book and project it into a feed entry
    pub fn project_feed_entry_at(
        &self,
        book: Book,
        price: Price,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<FeedEntry, BookstoreError> {
        let status = self.resolver.resolve_with(user, &book, &price, now)?;
        Ok(feed::project_feed_entry(book, price, status))
    }

    pub fn feed(
        &self,
        user: UserId,
        filter: &FeedFilter,
        page: usize,
        limit: usize,
    ) -> Result<FeedPage, BookstoreError> {
        self.feed_at(user, filter, page, limit, self.now())
    }

    /// One page of the user's feed; see [`FeedProjector::feed_at`]
    pub fn feed_at(
        &self,
        user: UserId,
        filter: &FeedFilter,
        page: usize,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<FeedPage, BookstoreError> {
        self.feed.feed_at(user, filter, page, limit, now)
    }

    pub fn authorize_page_read(
        &self,
        user: UserId,
        book: BookId,
        page: usize,
    ) -> Result<PageAccess, BookstoreError> {
        self.authorize_page_read_at(user, book, page, self.now())
    }

    pub fn authorize_page_read_at(
        &self,
        user: UserId,
        book: BookId,
        page: usize,
        now: DateTime<Utc>,
    ) -> Result<PageAccess, BookstoreError> {
        self.gate.authorize_page_read_at(user, book, page, now)
    }

    pub fn read_page(
        &self,
        user: UserId,
        book: BookId,
        page: usize,
        reader: &dyn ContentReader,
    ) -> Result<String, BookstoreError> {
        self.read_page_at(user, book, page, reader, self.now())
    }

    /// Authorize and read a page; see [`ContentAccessGate::read_page_at`]
    pub fn read_page_at(
        &self,
        user: UserId,
        book: BookId,
        page: usize,
        reader: &dyn ContentReader,
        now: DateTime<Utc>,
    ) -> Result<String, BookstoreError> {
        self.gate.read_page_at(user, book, page, reader, now)
    }

    /// Process a single replayed request
    ///
    /// Requests without a timestamp are evaluated at the engine clock's
    /// current instant. A denied page read is reported as `Forbidden`.
    ///
    /// # Arguments
    ///
    /// * `request` - The request to apply
    ///
    /// # Returns
    ///
    /// * `Ok(RequestOutcome)` describing what the engine did
    /// * `Err(BookstoreError)` if the request was rejected; nothing was written
    pub fn process(&self, request: &Request) -> Result<RequestOutcome, BookstoreError> {
        let now = request.at.unwrap_or_else(|| self.now());

        match &request.kind {
            RequestKind::Register => self.register(request.user).map(RequestOutcome::Registered),
            RequestKind::Execute { book, action } => self
                .execute_at(request.user, *book, action, now)
                .map(RequestOutcome::Committed),
            RequestKind::Resolve { book } => self
                .resolve_entitlement_at(request.user, *book, now)
                .map(RequestOutcome::Resolved),
            RequestKind::Read { book, page } => self
                .authorize_page_read_at(request.user, *book, *page, now)?
                .into_result()
                .map(RequestOutcome::PageAllowed),
        }
    }
}
