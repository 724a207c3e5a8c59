//! Content access gate
//!
//! Every page read goes through [`ContentAccessGate`], which resolves the
//! reader's entitlement again for each request. Nothing is cached, so an
//! expired rental stops working on the first read after its window closes.

use crate::core::resolver::EntitlementResolver;
use crate::core::traits::{AccountStore, CatalogStore, ContentReader};
use crate::types::{BookId, BookstoreError, ContentError, Entity, PageAccess, UserId};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub struct ContentAccessGate<C, A> {
    resolver: EntitlementResolver<C, A>,
}

impl<C, A> Clone for ContentAccessGate<C, A> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<C: CatalogStore, A: AccountStore> ContentAccessGate<C, A> {
    pub fn new(resolver: EntitlementResolver<C, A>) -> Self {
        Self { resolver }
    }

    /// Decide whether `user` may read `page` of `book` at `now`
    ///
    /// A denial is a normal outcome and comes back as
    /// [`PageAccess::Deny`]; only lookup and storage problems are errors.
    ///
    /// # Errors
    ///
    /// - `NotFound(Book)` / `NotFound(Price)` for unknown books
    /// - `StorageFailure` from the stores
    pub fn authorize_page_read_at(
        &self,
        user: UserId,
        book: BookId,
        page: usize,
        now: DateTime<Utc>,
    ) -> Result<PageAccess, BookstoreError> {
        let status = self.resolver.resolve_at(user, book, now)?;

        let access = if status.is_accessible() {
            PageAccess::Allow { status }
        } else {
            PageAccess::Deny {
                reason: BookstoreError::forbidden(user, book),
            }
        };
        debug!(user, book, page, allowed = access.is_allowed(), "Checked page access");

        Ok(access)
    }

    /// Authorize, then extract one page of the book's content
    ///
    /// # Errors
    ///
    /// - everything `authorize_page_read_at` returns
    /// - `Forbidden` if the user may not read the book
    /// - `NotFound(Content)` if no content was uploaded for the book
    /// - `InvalidArgument(page)` if the page is out of range
    /// - `Unavailable(UnsupportedFormat)` if the reader cannot handle the file
    /// - `StorageFailure` if the reader fails to load the file
    pub fn read_page_at(
        &self,
        user: UserId,
        book: BookId,
        page: usize,
        reader: &dyn ContentReader,
        now: DateTime<Utc>,
    ) -> Result<String, BookstoreError> {
        self.authorize_page_read_at(user, book, page, now)?
            .into_result()?;

        let location = self
            .resolver
            .catalog()
            .content_path(book)?
            .filter(|location| !location.is_empty())
            .ok_or_else(|| BookstoreError::not_found(Entity::Content(book)))?;

        reader
            .read_page(&location, page)
            .map_err(|error| {
                if let ContentError::Io { message } = &error {
                    warn!(
                        book,
                        page,
                        location = %location,
                        error = %message,
                        "Content read failed"
                    );
                }
                BookstoreError::from_content_error(book, page, error)
            })
    }
}
