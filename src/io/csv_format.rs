//! CSV format handling for catalog and request files and wallet output
//!
//! This module centralizes all CSV format concerns, providing:
//! - `CatalogRecord` / `RequestRecord` structures for deserialization
//! - Conversion from CSV records to domain types
//! - Wallet output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Formats
//!
//! Catalog: `book,title,categories,authors,year,hidden,buy,rent_2week,rent_month,rent_3month`
//! with `;`-separated categories and authors. An empty price cell means the
//! tier is not offered.
//!
//! Requests: `type,user,book,action,page,at` where `type` is one of
//! `register`, `execute`, `resolve`, `read` and `at` is an optional RFC 3339
//! timestamp.

use crate::types::{
    Amount, Book, BookId, BookstoreError, Price, Request, RequestKind, UserId, Wallet,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Write;

/// Separator of list values inside a single CSV cell
const LIST_SEPARATOR: char = ';';

/// One catalog row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogRecord {
    pub book: BookId,
    pub title: String,
    pub categories: Option<String>,
    pub authors: Option<String>,
    pub year: i32,
    pub hidden: Option<bool>,
    pub buy: Option<Amount>,
    pub rent_2week: Option<Amount>,
    pub rent_month: Option<Amount>,
    pub rent_3month: Option<Amount>,
}

/// One request log row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RequestRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: UserId,
    pub book: Option<BookId>,
    pub action: Option<String>,
    pub page: Option<usize>,
    pub at: Option<DateTime<Utc>>,
}

fn split_list(cell: Option<String>) -> BTreeSet<String> {
    cell.as_deref()
        .unwrap_or_default()
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a catalog row into a book and its prices
///
/// # Errors
///
/// - `InvalidArgument(title)` if the title is blank
pub fn convert_catalog_record(record: CatalogRecord) -> Result<(Book, Price), BookstoreError> {
    if record.title.trim().is_empty() {
        return Err(BookstoreError::invalid_argument("title", record.title));
    }

    let book = Book {
        id: record.book,
        title: record.title,
        categories: split_list(record.categories),
        authors: split_list(record.authors),
        year: record.year,
        hidden: record.hidden.unwrap_or(false),
    };
    let price = Price {
        book: record.book,
        buy: record.buy,
        rent_2week: record.rent_2week,
        rent_month: record.rent_month,
        rent_3month: record.rent_3month,
    };

    Ok((book, price))
}

/// Convert a request row into a [`Request`]
///
/// The request type is matched case-insensitively. The action token is
/// passed through untouched; the engine validates it.
///
/// # Errors
///
/// - `InvalidArgument(type)` for an unknown request type
/// - `InvalidArgument(book)` / `InvalidArgument(action)` when a request
///   type that needs the column leaves it empty
pub fn convert_request_record(record: RequestRecord) -> Result<Request, BookstoreError> {
    let book = || {
        record
            .book
            .ok_or_else(|| BookstoreError::invalid_argument("book", ""))
    };

    let kind = match record.kind.to_lowercase().as_str() {
        "register" => RequestKind::Register,
        "execute" => RequestKind::Execute {
            book: book()?,
            action: record
                .action
                .clone()
                .ok_or_else(|| BookstoreError::invalid_argument("action", ""))?,
        },
        "resolve" => RequestKind::Resolve { book: book()? },
        "read" => RequestKind::Read {
            book: book()?,
            page: record.page.unwrap_or(0),
        },
        _ => return Err(BookstoreError::invalid_argument("type", &record.kind)),
    };

    Ok(Request {
        user: record.user,
        kind,
        at: record.at,
    })
}

/// Write wallet balances to CSV format
///
/// Writes wallets with columns `user,balance`, sorted by user ID for
/// deterministic output.
pub fn write_wallets_csv(wallets: &[Wallet], output: &mut dyn Write) -> Result<(), BookstoreError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["user", "balance"])?;

    let mut sorted_wallets = wallets.to_vec();
    sorted_wallets.sort_by_key(|wallet| wallet.user);

    for wallet in sorted_wallets {
        writer.write_record(&[wallet.user.to_string(), wallet.balance.to_string()])?;
    }

    writer.flush()?;

    Ok(())
}
