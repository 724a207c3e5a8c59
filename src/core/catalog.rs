//! Thread-safe in-memory catalog
//!
//! This module provides the `InMemoryCatalog` struct, which stores books,
//! their prices and their content locations using `DashMap`.
//!
//! # Design
//!
//! A book, its price and its content location live in one map entry, so a
//! book can never be observed without its price. Creating a book inserts all
//! three at once with zeroed prices and no content, matching what a freshly
//! created catalog entry looks like before an administrator prices it.

use crate::config::MAX_CATALOG_PAGE_LIMIT;
use crate::core::traits::CatalogStore;
use crate::types::{
    Book, BookId, BookPatch, BookstoreError, CatalogPage, Entity, NewBook, Price,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// One catalog row: the book and everything owned 1:1 by it
#[derive(Debug, Clone)]
struct CatalogEntry {
    book: Book,
    price: Price,
    content: Option<String>,
}

/// Thread-safe catalog backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryCatalog {
    entries: DashMap<BookId, CatalogEntry>,

    /// Next identifier handed out by `create_book`
    next_id: AtomicU64,
}

impl InMemoryCatalog {
    /// Create an empty catalog; the first created book gets ID 1
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a book with zeroed prices and no content
    ///
    /// # Returns
    ///
    /// The stored book with its assigned ID
    pub fn create_book(&self, new_book: NewBook) -> Book {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let book = new_book.into_book(id);

        self.entries.insert(
            id,
            CatalogEntry {
                book: book.clone(),
                price: Price::zeroed(id),
                content: None,
            },
        );
        debug!(book = id, title = %book.title, "Created book");

        book
    }

    /// Insert a book under its own ID together with its prices
    ///
    /// Used when loading an existing catalog. IDs handed out later by
    /// `create_book` continue after the highest imported ID.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument(book)` if the ID is already taken or the price
    ///   belongs to another book
    pub fn import_book(&self, book: Book, price: Price) -> Result<(), BookstoreError> {
        if price.book != book.id {
            return Err(BookstoreError::invalid_argument("book", price.book));
        }

        let id = book.id;
        match self.entries.entry(id) {
            Entry::Occupied(_) => {
                return Err(BookstoreError::invalid_argument("book", id));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CatalogEntry {
                    book,
                    price,
                    content: None,
                });
            }
        }
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);

        Ok(())
    }

    /// Update a book's descriptive fields
    pub fn update_book(&self, book: BookId, patch: BookPatch) -> Result<Book, BookstoreError> {
        self.update(book, |entry| {
            patch.apply(&mut entry.book);
            entry.book.clone()
        })
    }

    /// Hide a book from users, or make it visible again
    pub fn set_hidden(&self, book: BookId, hidden: bool) -> Result<Book, BookstoreError> {
        self.update(book, |entry| {
            entry.book.hidden = hidden;
            entry.book.clone()
        })
    }

    /// Replace every tier price of a book
    ///
    /// # Errors
    ///
    /// - `NotFound(Book)` if the book does not exist
    /// - `InvalidArgument(book)` if the price belongs to another book
    pub fn set_price(&self, book: BookId, price: Price) -> Result<Price, BookstoreError> {
        if price.book != book {
            return Err(BookstoreError::invalid_argument("book", price.book));
        }
        self.update(book, |entry| {
            entry.price = price;
            entry.price.clone()
        })
    }

    /// Record where the book's content file is stored
    pub fn set_content(&self, book: BookId, location: &str) -> Result<(), BookstoreError> {
        self.update(book, |entry| {
            entry.content = Some(location.to_string());
        })
    }

    /// One page of every book with its prices, hidden books included
    ///
    /// # Errors
    ///
    /// - `InvalidArgument(page)` when `page` is zero
    /// - `InvalidArgument(limit)` when `limit` is zero or above
    ///   [`MAX_CATALOG_PAGE_LIMIT`]
    pub fn list_page(&self, page: usize, limit: usize) -> Result<CatalogPage, BookstoreError> {
        if page == 0 {
            return Err(BookstoreError::invalid_argument("page", page));
        }
        if limit == 0 || limit > MAX_CATALOG_PAGE_LIMIT {
            return Err(BookstoreError::invalid_argument("limit", limit));
        }

        let books = self.list_books()?;
        let total = books.len();
        let books = books
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(CatalogPage {
            total,
            page,
            limit,
            books,
        })
    }

    fn update<R>(
        &self,
        book: BookId,
        f: impl FnOnce(&mut CatalogEntry) -> R,
    ) -> Result<R, BookstoreError> {
        match self.entries.get_mut(&book) {
            Some(mut entry) => Ok(f(entry.value_mut())),
            None => Err(BookstoreError::not_found(Entity::Book(book))),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn get_book(&self, book: BookId) -> Result<Book, BookstoreError> {
        self.entries
            .get(&book)
            .map(|entry| entry.book.clone())
            .ok_or_else(|| BookstoreError::not_found(Entity::Book(book)))
    }

    fn get_price(&self, book: BookId) -> Result<Price, BookstoreError> {
        self.entries
            .get(&book)
            .map(|entry| entry.price.clone())
            .ok_or_else(|| BookstoreError::not_found(Entity::Price(book)))
    }

    fn content_path(&self, book: BookId) -> Result<Option<String>, BookstoreError> {
        self.entries
            .get(&book)
            .map(|entry| entry.content.clone())
            .ok_or_else(|| BookstoreError::not_found(Entity::Book(book)))
    }

    fn list_books(&self) -> Result<Vec<(Book, Price)>, BookstoreError> {
        let mut books: Vec<(Book, Price)> = self
            .entries
            .iter()
            .map(|entry| (entry.book.clone(), entry.price.clone()))
            .collect();
        books.sort_by_key(|(book, _)| book.id);
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            year: 2001,
            ..NewBook::default()
        }
    }

    #[test]
    fn test_create_book_assigns_ascending_ids() {
        let catalog = InMemoryCatalog::new();

        let first = catalog.create_book(new_book("First"));
        let second = catalog.create_book(new_book("Second"));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(catalog.get_book(2).unwrap().title, "Second");
    }

    #[test]
    fn test_created_book_has_zeroed_price_and_no_content() {
        let catalog = InMemoryCatalog::new();
        let book = catalog.create_book(new_book("Fresh"));

        assert_eq!(catalog.get_price(book.id).unwrap(), Price::zeroed(book.id));
        assert_eq!(catalog.content_path(book.id).unwrap(), None);
    }

    #[test]
    fn test_missing_book_and_price() {
        let catalog = InMemoryCatalog::new();

        assert_eq!(
            catalog.get_book(9).unwrap_err(),
            BookstoreError::not_found(Entity::Book(9))
        );
        assert_eq!(
            catalog.get_price(9).unwrap_err(),
            BookstoreError::not_found(Entity::Price(9))
        );
        assert_eq!(
            catalog.set_hidden(9, true).unwrap_err(),
            BookstoreError::not_found(Entity::Book(9))
        );
    }

    #[test]
    fn test_import_rejects_duplicates_and_moves_next_id() {
        let catalog = InMemoryCatalog::new();
        let book = new_book("Imported").into_book(10);

        catalog.import_book(book.clone(), Price::zeroed(10)).unwrap();
        assert_eq!(
            catalog.import_book(book, Price::zeroed(10)).unwrap_err(),
            BookstoreError::invalid_argument("book", 10)
        );

        let created = catalog.create_book(new_book("After import"));
        assert_eq!(created.id, 11);
    }

    #[test]
    fn test_set_price_rejects_foreign_price() {
        let catalog = InMemoryCatalog::new();
        let book = catalog.create_book(new_book("Priced"));

        let err = catalog.set_price(book.id, Price::zeroed(book.id + 1)).unwrap_err();
        assert_eq!(err, BookstoreError::invalid_argument("book", book.id + 1));
    }

    #[test]
    fn test_management_updates() {
        let catalog = InMemoryCatalog::new();
        let book = catalog.create_book(new_book("Draft"));

        let price = Price {
            book: book.id,
            buy: Some(300),
            rent_2week: None,
            rent_month: Some(60),
            rent_3month: Some(120),
        };
        catalog.set_price(book.id, price.clone()).unwrap();
        catalog.set_hidden(book.id, true).unwrap();
        catalog.set_content(book.id, "/books/draft.epub").unwrap();
        catalog
            .update_book(
                book.id,
                BookPatch {
                    title: Some("Final".to_string()),
                    ..BookPatch::default()
                },
            )
            .unwrap();

        let stored = catalog.get_book(book.id).unwrap();
        assert_eq!(stored.title, "Final");
        assert!(stored.hidden);
        assert_eq!(catalog.get_price(book.id).unwrap(), price);
        assert_eq!(
            catalog.content_path(book.id).unwrap().as_deref(),
            Some("/books/draft.epub")
        );
    }

    #[rstest]
    #[case::first(1, 2, vec![1, 2])]
    #[case::last(2, 2, vec![3])]
    #[case::past_end(3, 2, vec![])]
    #[case::max_limit(1, MAX_CATALOG_PAGE_LIMIT, vec![1, 2, 3])]
    fn test_list_page(#[case] page: usize, #[case] limit: usize, #[case] expected: Vec<BookId>) {
        let catalog = InMemoryCatalog::new();
        for title in ["A", "B", "C"] {
            catalog.create_book(new_book(title));
        }
        catalog.set_hidden(2, true).unwrap();

        let result = catalog.list_page(page, limit).unwrap();
        let ids: Vec<BookId> = result.books.iter().map(|(book, _)| book.id).collect();

        assert_eq!(result.total, 3);
        assert_eq!(result.page, page);
        assert_eq!(result.limit, limit);
        assert_eq!(ids, expected);
    }

    #[rstest]
    #[case::zero_page(0, 10, "page", 0)]
    #[case::zero_limit(1, 0, "limit", 0)]
    #[case::limit_too_large(1, 101, "limit", 101)]
    fn test_list_page_rejects_bad_paging(
        #[case] page: usize,
        #[case] limit: usize,
        #[case] field: &str,
        #[case] value: usize,
    ) {
        let catalog = InMemoryCatalog::new();
        assert_eq!(
            catalog.list_page(page, limit).unwrap_err(),
            BookstoreError::invalid_argument(field, value)
        );
    }

    #[test]
    fn test_list_books_sorted_by_id() {
        let catalog = InMemoryCatalog::new();
        catalog.import_book(new_book("C").into_book(3), Price::zeroed(3)).unwrap();
        catalog.import_book(new_book("A").into_book(1), Price::zeroed(1)).unwrap();
        catalog.import_book(new_book("B").into_book(2), Price::zeroed(2)).unwrap();

        let ids: Vec<BookId> = catalog
            .list_books()
            .unwrap()
            .into_iter()
            .map(|(book, _)| book.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
