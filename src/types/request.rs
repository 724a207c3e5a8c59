//! Replayable engine requests
//!
//! A [`Request`] is one call a client made against the engine. The replay
//! CLI reads them from a request log and feeds them to the engine in order.

use super::book::BookId;
use super::entitlement::EntitlementStatus;
use super::transaction::Transaction;
use super::wallet::{UserId, Wallet};
use chrono::{DateTime, Utc};

/// What a request asks the engine to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Open the user's wallet
    Register,

    /// Buy or rent a book; `action` is the raw action token
    Execute { book: BookId, action: String },

    /// Look up the user's entitlement status for a book
    Resolve { book: BookId },

    /// Open one page of a book
    Read { book: BookId, page: usize },
}

/// A single request from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub user: UserId,
    pub kind: RequestKind,

    /// Instant the request was made; `None` means "now" on the engine clock
    pub at: Option<DateTime<Utc>>,
}

/// Successful result of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Registered(Wallet),
    Committed(Transaction),
    Resolved(EntitlementStatus),

    /// Page access was granted under this status
    PageAllowed(EntitlementStatus),
}
