//! Feed status projection
//!
//! Turns catalog books into the entries a user sees in their listing, each
//! carrying the user's entitlement status and whether they may open it.

use crate::core::resolver::EntitlementResolver;
use crate::core::traits::{AccountStore, CatalogStore};
use crate::types::{
    Book, BookstoreError, EntitlementStatus, FeedEntry, FeedFilter, FeedPage, Price, UserId,
};
use chrono::{DateTime, Utc};

/// Build the listing entry for a book under an already resolved status
pub fn project_feed_entry(book: Book, price: Price, status: EntitlementStatus) -> FeedEntry {
    FeedEntry {
        open_for_read: status.is_accessible(),
        book,
        price,
        status,
    }
}

/// Builds filtered, paginated feeds for users
pub struct FeedProjector<C, A> {
    resolver: EntitlementResolver<C, A>,
}

impl<C, A> Clone for FeedProjector<C, A> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<C: CatalogStore, A: AccountStore> FeedProjector<C, A> {
    pub fn new(resolver: EntitlementResolver<C, A>) -> Self {
        Self { resolver }
    }

    /// One page of the user's feed at `now`
    ///
    /// Books are listed in ascending ID order, filtered, then cut into pages
    /// of `limit` entries. Hidden books stay listed under their resolved
    /// status, so holders of a hidden book still find it.
    ///
    /// # Arguments
    ///
    /// * `page` - 1-based page number
    /// * `limit` - Entries per page
    ///
    /// # Errors
    ///
    /// - `InvalidArgument(page)` / `InvalidArgument(limit)` when either is zero
    /// - `StorageFailure` from the stores
    pub fn feed_at(
        &self,
        user: UserId,
        filter: &FeedFilter,
        page: usize,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<FeedPage, BookstoreError> {
        if page == 0 {
            return Err(BookstoreError::invalid_argument("page", page));
        }
        if limit == 0 {
            return Err(BookstoreError::invalid_argument("limit", limit));
        }

        let mut matching = Vec::new();
        for (book, price) in self.resolver.catalog().list_books()? {
            if !filter.matches_book(&book) {
                continue;
            }
            let status = self.resolver.resolve_with(user, &book, &price, now)?;
            let entry = project_feed_entry(book, price, status);
            if filter.matches_entry(&entry) {
                matching.push(entry);
            }
        }

        let total = matching.len();
        let entries = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(FeedPage {
            total,
            page,
            limit,
            entries,
        })
    }
}
