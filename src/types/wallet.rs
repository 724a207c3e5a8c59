//! Wallet types for the bookstore
//!
//! Each registered user owns exactly one wallet. The balance is only ever
//! decremented by a committed purchase or rental.

use super::book::Amount;
use super::error::BookstoreError;
use serde::{Deserialize, Serialize};

/// User identifier as resolved by the identity provider
pub type UserId = u64;

/// A user's wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Owner of the wallet
    pub user: UserId,

    /// Spendable balance; never negative
    pub balance: Amount,
}

impl Wallet {
    /// Create a wallet holding the given starting balance
    pub fn new(user: UserId, balance: Amount) -> Self {
        Wallet { user, balance }
    }

    /// Subtract `amount` from the balance
    ///
    /// A debit larger than the balance is rejected and leaves the wallet
    /// untouched; it is never clamped to zero.
    pub fn debit(&mut self, amount: Amount) -> Result<(), BookstoreError> {
        self.balance = self.balance.checked_sub(amount).ok_or_else(|| {
            BookstoreError::insufficient_funds(self.user, self.balance, amount)
        })?;
        Ok(())
    }
}
