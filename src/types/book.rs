//! Catalog types for the bookstore
//!
//! Books and their prices are owned by the catalog. The engine only reads
//! them; every book carries exactly one [`Price`] created together with it.

use super::transaction::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Book identifier
pub type BookId = u64;

/// Money amount in whole currency units
///
/// Unsigned so that a wallet balance can never be represented as negative.
pub type Amount = u64;

/// A catalog book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog identifier
    pub id: BookId,

    /// Display title
    pub title: String,

    /// Categories the book is listed under
    pub categories: BTreeSet<String>,

    /// Book authors
    pub authors: BTreeSet<String>,

    /// Year the book was written
    pub year: i32,

    /// Hidden books cannot be bought, rented or read for free
    pub hidden: bool,
}

/// Input for creating a catalog book (the identifier is assigned by the catalog)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewBook {
    pub title: String,
    pub categories: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub year: i32,
    pub hidden: bool,
}

impl NewBook {
    /// Attach an identifier, producing the stored [`Book`]
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            categories: self.categories,
            authors: self.authors,
            year: self.year,
            hidden: self.hidden,
        }
    }
}

/// Partial update of a book's descriptive fields
///
/// `None` leaves the field untouched. Visibility is changed separately
/// through the catalog's hide operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub categories: Option<BTreeSet<String>>,
    pub authors: Option<BTreeSet<String>>,
    pub year: Option<i32>,
}

impl BookPatch {
    /// Apply the patch to a book in place
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(categories) = self.categories {
            book.categories = categories;
        }
        if let Some(authors) = self.authors {
            book.authors = authors;
        }
        if let Some(year) = self.year {
            book.year = year;
        }
    }
}

/// Prices of a book for each tier
///
/// `None` means the tier is not offered. A buy price of exactly zero marks
/// the book as free to read, which is different from having no buy price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// The book these prices belong to
    pub book: BookId,

    /// Permanent purchase price
    pub buy: Option<Amount>,

    /// Two week rental price
    pub rent_2week: Option<Amount>,

    /// One month rental price
    pub rent_month: Option<Amount>,

    /// Three month rental price
    pub rent_3month: Option<Amount>,
}

impl Price {
    /// Prices assigned to a freshly created book: every tier set to zero
    pub fn zeroed(book: BookId) -> Self {
        Price {
            book,
            buy: Some(0),
            rent_2week: Some(0),
            rent_month: Some(0),
            rent_3month: Some(0),
        }
    }

    /// Price configured for a tier, if any
    pub fn for_tier(&self, tier: Tier) -> Option<Amount> {
        match tier {
            Tier::Buy => self.buy,
            Tier::Rent2Week => self.rent_2week,
            Tier::RentMonth => self.rent_month,
            Tier::Rent3Month => self.rent_3month,
        }
    }

    /// Price that can actually be charged for a tier
    ///
    /// Zero and absent prices both mean the tier cannot be bought.
    pub fn chargeable(&self, tier: Tier) -> Option<Amount> {
        self.for_tier(tier).filter(|price| *price > 0)
    }

    /// Whether the buy price marks the book as free to read
    pub fn is_free(&self) -> bool {
        self.buy == Some(0)
    }
}

/// One page of the administrative catalog listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogPage {
    /// Number of books in the catalog, hidden ones included
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub books: Vec<(Book, Price)>,
}
