//! Error types for the bookstore entitlement engine
//!
//! This module defines every error the engine can report. The variants map
//! one-to-one onto the outcomes callers have to handle; none of them carry
//! storage internals.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: missing book, price, wallet or content
//! - **Request Errors**: invalid arguments, unavailable books
//! - **Entitlement Errors**: insufficient funds, already entitled, forbidden
//! - **Storage Errors**: opaque collaborator failures
//! - **File Errors**: file not found, I/O and CSV parsing (replay CLI only)

use super::book::{Amount, BookId};
use super::entitlement::EntitlementStatus;
use super::wallet::UserId;
use std::fmt;
use thiserror::Error;

/// The kind of record a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Book(BookId),
    Price(BookId),
    Wallet(UserId),
    Content(BookId),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Book(book) => write!(f, "Book {}", book),
            Entity::Price(book) => write!(f, "Price for book {}", book),
            Entity::Wallet(user) => write!(f, "Wallet for user {}", user),
            Entity::Content(book) => write!(f, "Content for book {}", book),
        }
    }
}

/// Why a book cannot be bought, rented or read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The book is hidden from users
    Hidden,

    /// The requested tier has no positive price
    NotForSale,

    /// The content file has a format the reader cannot extract
    UnsupportedFormat,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::Hidden => f.write_str("hidden"),
            UnavailableReason::NotForSale => f.write_str("not for sale"),
            UnavailableReason::UnsupportedFormat => f.write_str("unsupported content format"),
        }
    }
}

/// Main error type for the entitlement engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookstoreError {
    /// A referenced record does not exist
    #[error("{entity} not found")]
    NotFound {
        /// The missing record
        entity: Entity,
    },

    /// A request argument has an unacceptable value
    #[error("Invalid {field}: '{value}'")]
    InvalidArgument {
        /// Name of the offending argument
        field: String,
        /// The rejected value
        value: String,
    },

    /// The book exists but cannot be used for this request
    #[error("Book {book} is unavailable: {reason}")]
    Unavailable {
        /// Book ID
        book: BookId,
        /// Why the book is unavailable
        reason: UnavailableReason,
    },

    /// The wallet balance does not cover the price
    ///
    /// No transaction is recorded and the wallet is unchanged.
    #[error("Insufficient funds for user {user}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// User ID
        user: UserId,
        /// Balance at the time of the check
        balance: Amount,
        /// Price of the requested tier
        requested: Amount,
    },

    /// The user already holds an active purchase or rental of the book
    #[error("User {user} already holds '{status}' for book {book}")]
    AlreadyEntitled {
        /// User ID
        user: UserId,
        /// Book ID
        book: BookId,
        /// The active entitlement
        status: EntitlementStatus,
    },

    /// The user may not read the book
    #[error("User {user} is not allowed to read book {book}")]
    Forbidden {
        /// User ID
        user: UserId,
        /// Book ID
        book: BookId,
    },

    /// A storage collaborator failed; nothing was committed
    #[error("Storage failure: {message}")]
    StorageFailure {
        /// Description of the failure
        message: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// The malformed record is skipped and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

/// Cause reported to callers when a content reader fails on I/O
pub const CONTENT_READ_FAILURE: &str = "content could not be read";

/// Failures reported by a content reader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Page {page} is out of range")]
    OutOfRange { page: usize },

    #[error("Unsupported content format '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Content I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for BookstoreError {
    fn from(error: std::io::Error) -> Self {
        BookstoreError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for BookstoreError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        BookstoreError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BookstoreError {
    /// Create a NotFound error
    pub fn not_found(entity: Entity) -> Self {
        BookstoreError::NotFound { entity }
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(field: &str, value: impl ToString) -> Self {
        BookstoreError::InvalidArgument {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an Unavailable error
    pub fn unavailable(book: BookId, reason: UnavailableReason) -> Self {
        BookstoreError::Unavailable { book, reason }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(user: UserId, balance: Amount, requested: Amount) -> Self {
        BookstoreError::InsufficientFunds {
            user,
            balance,
            requested,
        }
    }

    /// Create an AlreadyEntitled error
    pub fn already_entitled(user: UserId, book: BookId, status: EntitlementStatus) -> Self {
        BookstoreError::AlreadyEntitled { user, book, status }
    }

    /// Create a Forbidden error
    pub fn forbidden(user: UserId, book: BookId) -> Self {
        BookstoreError::Forbidden { user, book }
    }

    /// Create a StorageFailure error
    pub fn storage_failure(message: impl ToString) -> Self {
        BookstoreError::StorageFailure {
            message: message.to_string(),
        }
    }

    /// Create a ParseError error
    pub fn parse_error(line: Option<u64>, message: impl ToString) -> Self {
        BookstoreError::ParseError {
            line,
            message: message.to_string(),
        }
    }

    /// Map a content reader failure for the given book and page
    ///
    /// Reader I/O details stay out of the returned error; callers log them.
    pub fn from_content_error(book: BookId, page: usize, error: ContentError) -> Self {
        match error {
            ContentError::OutOfRange { .. } => BookstoreError::invalid_argument("page", page),
            ContentError::UnsupportedFormat { .. } => {
                BookstoreError::unavailable(book, UnavailableReason::UnsupportedFormat)
            }
            ContentError::Io { .. } => BookstoreError::storage_failure(CONTENT_READ_FAILURE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::book_not_found(
        BookstoreError::not_found(Entity::Book(7)),
        "Book 7 not found"
    )]
    #[case::wallet_not_found(
        BookstoreError::not_found(Entity::Wallet(3)),
        "Wallet for user 3 not found"
    )]
    #[case::invalid_action(
        BookstoreError::invalid_argument("action", "lease"),
        "Invalid action: 'lease'"
    )]
    #[case::hidden(
        BookstoreError::unavailable(4, UnavailableReason::Hidden),
        "Book 4 is unavailable: hidden"
    )]
    #[case::not_for_sale(
        BookstoreError::unavailable(4, UnavailableReason::NotForSale),
        "Book 4 is unavailable: not for sale"
    )]
    #[case::insufficient_funds(
        BookstoreError::insufficient_funds(1, 40, 50),
        "Insufficient funds for user 1: balance 40, requested 50"
    )]
    #[case::already_entitled(
        BookstoreError::already_entitled(1, 2, EntitlementStatus::Buy),
        "User 1 already holds 'buy' for book 2"
    )]
    #[case::forbidden(
        BookstoreError::forbidden(1, 2),
        "User 1 is not allowed to read book 2"
    )]
    #[case::parse_error_with_line(
        BookstoreError::parse_error(Some(42), "Invalid field"),
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        BookstoreError::parse_error(None, "Invalid field"),
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: BookstoreError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::out_of_range(
        ContentError::OutOfRange { page: 12 },
        BookstoreError::invalid_argument("page", 12)
    )]
    #[case::unsupported(
        ContentError::UnsupportedFormat { extension: ".djvu".to_string() },
        BookstoreError::unavailable(9, UnavailableReason::UnsupportedFormat)
    )]
    #[case::io(
        ContentError::Io { message: "/srv/books/9.pdf: disk gone".to_string() },
        BookstoreError::storage_failure(CONTENT_READ_FAILURE)
    )]
    fn test_content_error_mapping(#[case] error: ContentError, #[case] expected: BookstoreError) {
        assert_eq!(BookstoreError::from_content_error(9, 12, error), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: BookstoreError = io_error.into();
        assert!(matches!(error, BookstoreError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
