//! Core traits for catalog lookup, wallet/ledger storage and content reading
//!
//! The engine is written against these traits rather than a particular
//! database. The in-memory implementations in [`crate::core::catalog`] and
//! [`crate::core::account_store`] back the replay CLI and the tests.

use crate::types::{
    Amount, Book, BookId, BookstoreError, ContentError, Price, Transaction, UserId, Wallet,
};

/// Read access to the catalog
pub trait CatalogStore: Send + Sync {
    /// Get a book by ID
    fn get_book(&self, book: BookId) -> Result<Book, BookstoreError>;

    /// Get the prices of a book
    fn get_price(&self, book: BookId) -> Result<Price, BookstoreError>;

    /// Location of the book's content file, if one was uploaded
    fn content_path(&self, book: BookId) -> Result<Option<String>, BookstoreError>;

    /// Every book with its prices, in ascending ID order
    fn list_books(&self) -> Result<Vec<(Book, Price)>, BookstoreError>;
}

/// Storage of wallets and the transaction ledger
///
/// Wallets and the ledger are only mutated together, through
/// [`AccountStore::transact`].
pub trait AccountStore: Send + Sync {
    /// Open a wallet with the given balance
    ///
    /// Opening a wallet that already exists returns it unchanged.
    fn open_wallet(&self, user: UserId, balance: Amount) -> Result<Wallet, BookstoreError>;

    /// Get a user's wallet
    fn get_wallet(&self, user: UserId) -> Result<Wallet, BookstoreError>;

    /// Every ledger transaction of a user for one book, oldest first
    fn list_transactions(
        &self,
        user: UserId,
        book: BookId,
    ) -> Result<Vec<Transaction>, BookstoreError>;

    /// A user's wallet together with their whole ledger, oldest first
    ///
    /// Both are read under the same lock as [`AccountStore::transact`], so
    /// the balance always reflects exactly the returned transactions.
    /// Separate `get_wallet` and `list_transactions` calls give no such
    /// guarantee.
    fn account_snapshot(
        &self,
        user: UserId,
    ) -> Result<(Wallet, Vec<Transaction>), BookstoreError>;

    /// Run a purchase as a single unit of work
    ///
    /// While `plan` runs, no other unit of work for `user` can proceed.
    /// `plan` receives the current wallet and the user's ledger for `book`
    /// and returns the transaction to record. The store then debits the
    /// wallet by the transaction's price and appends the transaction; both
    /// writes become visible together or not at all. Any error, from `plan`
    /// or from the store, leaves wallet and ledger untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound(Wallet)` if the user has no wallet
    /// - whatever `plan` returns
    /// - `InsufficientFunds` if the debit would overdraw the wallet
    /// - `StorageFailure` if the commit cannot be made durable
    fn transact<F>(&self, user: UserId, book: BookId, plan: F) -> Result<Transaction, BookstoreError>
    where
        F: FnOnce(&Wallet, &[Transaction]) -> Result<Transaction, BookstoreError>;

    /// Snapshot of every wallet
    fn wallets(&self) -> Result<Vec<Wallet>, BookstoreError>;
}

/// Extracts page text from stored book content
pub trait ContentReader: Send + Sync {
    /// Read one zero-based page from the content at `location`
    fn read_page(&self, location: &str, page: usize) -> Result<String, ContentError>;
}
