//! Transaction-related types for the bookstore ledger
//!
//! This module defines the purchase/rental tiers and the immutable ledger
//! transactions recorded when a user buys or rents a book.

use super::book::{Amount, BookId};
use super::error::BookstoreError;
use super::wallet::UserId;
use crate::config::RentalTerms;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The monetizable access modes of a book
///
/// The serialized names double as the action tokens accepted by the
/// orchestrator: `buy`, `rent_2week`, `rent_month` and `rent_3month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Permanent purchase; never expires
    #[serde(rename = "buy")]
    Buy,

    /// Two week rental
    #[serde(rename = "rent_2week")]
    Rent2Week,

    /// One month rental
    #[serde(rename = "rent_month")]
    RentMonth,

    /// Three month rental
    #[serde(rename = "rent_3month")]
    Rent3Month,
}

impl Tier {
    /// Every tier, purchase first
    pub const ALL: [Tier; 4] = [Tier::Buy, Tier::Rent2Week, Tier::RentMonth, Tier::Rent3Month];

    /// The action token for this tier
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Buy => "buy",
            Tier::Rent2Week => "rent_2week",
            Tier::RentMonth => "rent_month",
            Tier::Rent3Month => "rent_3month",
        }
    }

    /// Whether this tier grants time-bounded access
    pub fn is_rental(self) -> bool {
        !matches!(self, Tier::Buy)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = BookstoreError;

    /// Parse an action token; matching is exact (no trimming, no case folding)
    fn from_str(action: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == action)
            .ok_or_else(|| BookstoreError::invalid_argument("action", action))
    }
}

/// A ledger entry recording a purchase or rental
///
/// Transactions are never modified after creation. Renewing a rental means
/// appending a new transaction once the previous one has expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The buyer
    pub user: UserId,

    /// The purchased or rented book
    pub book: BookId,

    /// When the transaction was committed
    pub date_buy: DateTime<Utc>,

    /// Amount debited from the wallet
    pub price: Amount,

    /// Purchased tier
    pub tier: Tier,
}

impl Transaction {
    /// End of the access window, or `None` for a permanent purchase
    pub fn expires_at(&self, terms: &RentalTerms) -> Option<DateTime<Utc>> {
        terms.duration(self.tier).map(|duration| self.date_buy + duration)
    }

    /// Whether the transaction still grants access at `now`
    ///
    /// The window is half-open: access ends exactly at `date_buy + duration`.
    pub fn is_active_at(&self, now: DateTime<Utc>, terms: &RentalTerms) -> bool {
        match self.expires_at(terms) {
            None => true,
            Some(expires_at) => now < expires_at,
        }
    }
}
