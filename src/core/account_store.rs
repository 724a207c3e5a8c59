//! Thread-safe wallet and ledger storage
//!
//! This module provides the `InMemoryAccountStore` struct, which keeps every
//! user's wallet and transaction ledger using `DashMap`.
//!
//! # Design
//!
//! A user's wallet and ledger share a single map entry. A unit of work takes
//! the entry's write guard, runs the caller's checks, then debits and appends
//! before releasing it. Readers therefore see the account either before or
//! after a purchase, never a debited wallet without its transaction, and two
//! purchases for the same user are serialized.
//!
//! # Thread Safety
//!
//! Operations on different users proceed in parallel; operations on the
//! same user are serialized by the entry lock. Plans passed to
//! [`AccountStore::transact`] must not call back into the store.

use crate::core::traits::AccountStore;
use crate::types::{
    Amount, BookId, BookstoreError, Entity, Transaction, UserId, Wallet,
};
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::{debug, info};

/// Wallet plus the full ledger of one user
#[derive(Debug, Clone)]
struct UserAccount {
    wallet: Wallet,
    ledger: HashMap<BookId, Vec<Transaction>>,
}

/// Thread-safe wallet and ledger store backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: DashMap<UserId, UserAccount>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn open_wallet(&self, user: UserId, balance: Amount) -> Result<Wallet, BookstoreError> {
        let account = self.accounts.entry(user).or_insert_with(|| {
            info!(user, balance, "Opened wallet");
            UserAccount {
                wallet: Wallet::new(user, balance),
                ledger: HashMap::new(),
            }
        });
        Ok(account.wallet.clone())
    }

    fn get_wallet(&self, user: UserId) -> Result<Wallet, BookstoreError> {
        self.accounts
            .get(&user)
            .map(|account| account.wallet.clone())
            .ok_or_else(|| BookstoreError::not_found(Entity::Wallet(user)))
    }

    fn list_transactions(
        &self,
        user: UserId,
        book: BookId,
    ) -> Result<Vec<Transaction>, BookstoreError> {
        Ok(self
            .accounts
            .get(&user)
            .and_then(|account| account.ledger.get(&book).cloned())
            .unwrap_or_default())
    }

    fn account_snapshot(
        &self,
        user: UserId,
    ) -> Result<(Wallet, Vec<Transaction>), BookstoreError> {
        let account = self
            .accounts
            .get(&user)
            .ok_or_else(|| BookstoreError::not_found(Entity::Wallet(user)))?;

        let mut ledger: Vec<Transaction> = account.ledger.values().flatten().cloned().collect();
        ledger.sort_by_key(|transaction| (transaction.date_buy, transaction.book));

        Ok((account.wallet.clone(), ledger))
    }

    fn transact<F>(&self, user: UserId, book: BookId, plan: F) -> Result<Transaction, BookstoreError>
    where
        F: FnOnce(&Wallet, &[Transaction]) -> Result<Transaction, BookstoreError>,
    {
        let mut entry = self
            .accounts
            .get_mut(&user)
            .ok_or_else(|| BookstoreError::not_found(Entity::Wallet(user)))?;
        let account = entry.value_mut();

        let history = account.ledger.get(&book).map(Vec::as_slice).unwrap_or(&[]);
        let transaction = plan(&account.wallet, history)?;

        if transaction.user != user || transaction.book != book {
            return Err(BookstoreError::storage_failure(
                "transaction does not belong to the locked account",
            ));
        }

        // Stage the debit on a copy so a failure leaves the wallet as it was
        let mut wallet = account.wallet.clone();
        wallet.debit(transaction.price)?;

        account.wallet = wallet;
        account
            .ledger
            .entry(book)
            .or_default()
            .push(transaction.clone());
        debug!(user, book, balance = account.wallet.balance, "Committed unit of work");

        Ok(transaction)
    }

    fn wallets(&self) -> Result<Vec<Wallet>, BookstoreError> {
        Ok(self
            .accounts
            .iter()
            .map(|entry| entry.value().wallet.clone())
            .collect())
    }
}
