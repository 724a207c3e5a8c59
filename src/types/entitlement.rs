//! Entitlement status and the views derived from it
//!
//! [`EntitlementStatus`] is the closed set of outcomes of entitlement
//! resolution. Feed listings and the content gate are projections of it.

use super::book::{Book, Price};
use super::error::BookstoreError;
use super::transaction::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A user's relationship with a book at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementStatus {
    /// Free book, readable by anyone
    Free,

    /// Bought permanently
    Buy,

    /// Active two week rental
    #[serde(rename = "rent_2week")]
    Rent2Week,

    /// Active one month rental
    RentMonth,

    /// Active three month rental
    #[serde(rename = "rent_3month")]
    Rent3Month,

    /// Rented before, but every rental has expired
    RentExpired,

    /// Paid book the user never bought or rented
    #[serde(rename = "none")]
    NotEntitled,
}

impl EntitlementStatus {
    /// Status granted by an active transaction of the given tier
    pub fn from_tier(tier: Tier) -> Self {
        match tier {
            Tier::Buy => EntitlementStatus::Buy,
            Tier::Rent2Week => EntitlementStatus::Rent2Week,
            Tier::RentMonth => EntitlementStatus::RentMonth,
            Tier::Rent3Month => EntitlementStatus::Rent3Month,
        }
    }

    /// Whether the user may read the book's content
    pub fn is_accessible(self) -> bool {
        match self {
            EntitlementStatus::Free
            | EntitlementStatus::Buy
            | EntitlementStatus::Rent2Week
            | EntitlementStatus::RentMonth
            | EntitlementStatus::Rent3Month => true,
            EntitlementStatus::RentExpired | EntitlementStatus::NotEntitled => false,
        }
    }

    /// Whether the status comes from an active ledger transaction
    ///
    /// Such a status blocks another purchase or rental of the same book.
    /// Free access does not come from the ledger and never blocks.
    pub fn is_active_transaction(self) -> bool {
        self.is_accessible() && self != EntitlementStatus::Free
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntitlementStatus::Free => "free",
            EntitlementStatus::Buy => "buy",
            EntitlementStatus::Rent2Week => "rent_2week",
            EntitlementStatus::RentMonth => "rent_month",
            EntitlementStatus::Rent3Month => "rent_3month",
            EntitlementStatus::RentExpired => "rent_expired",
            EntitlementStatus::NotEntitled => "none",
        }
    }
}

impl fmt::Display for EntitlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the content access gate
#[derive(Debug, Clone, PartialEq)]
pub enum PageAccess {
    /// Reading is permitted under the given status
    Allow { status: EntitlementStatus },

    /// Reading is refused
    Deny { reason: BookstoreError },
}

impl PageAccess {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PageAccess::Allow { .. })
    }

    /// Turn a denial into an error
    pub fn into_result(self) -> Result<EntitlementStatus, BookstoreError> {
        match self {
            PageAccess::Allow { status } => Ok(status),
            PageAccess::Deny { reason } => Err(reason),
        }
    }
}

/// A book as shown in a user's catalog listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub book: Book,
    pub price: Price,
    pub open_for_read: bool,
    pub status: EntitlementStatus,
}

/// Listing filters; every field is optional and unset fields match everything
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedFilter {
    /// Keep books sharing at least one of these categories
    pub categories: Option<BTreeSet<String>>,

    /// Keep books sharing at least one of these authors
    pub authors: Option<BTreeSet<String>>,

    /// Inclusive lower bound on the creation year
    pub year_from: Option<i32>,

    /// Inclusive upper bound on the creation year
    pub year_to: Option<i32>,

    /// Keep entries whose `open_for_read` equals this value
    pub open_for_read: Option<bool>,
}

impl FeedFilter {
    /// Whether the book passes the catalog part of the filter
    ///
    /// `open_for_read` depends on the caller and is checked on the projected
    /// entry instead.
    pub fn matches_book(&self, book: &Book) -> bool {
        let overlaps = |wanted: &Option<BTreeSet<String>>, have: &BTreeSet<String>| {
            wanted
                .as_ref()
                .map_or(true, |wanted| wanted.is_empty() || !wanted.is_disjoint(have))
        };

        overlaps(&self.categories, &book.categories)
            && overlaps(&self.authors, &book.authors)
            && self.year_from.map_or(true, |from| book.year >= from)
            && self.year_to.map_or(true, |to| book.year <= to)
    }

    /// Whether a projected entry passes the filter
    pub fn matches_entry(&self, entry: &FeedEntry) -> bool {
        self.matches_book(&entry.book)
            && self
                .open_for_read
                .map_or(true, |open| entry.open_for_read == open)
    }
}

/// One page of a user's feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage {
    /// Matching entries across all pages
    pub total: usize,

    /// 1-based page number
    pub page: usize,

    /// Maximum entries per page
    pub limit: usize,

    pub entries: Vec<FeedEntry>,
}
