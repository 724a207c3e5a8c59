//! Entitlement resolution
//!
//! Derives a user's [`EntitlementStatus`] for a book from the book's price,
//! its visibility and the user's ledger history, evaluated at an instant.
//!
//! Resolution order (first match wins):
//! 1. buy price is zero and the book is visible: `Free`
//! 2. any purchase in the history: `Buy`
//! 3. any rental whose window contains the instant: that rental's tier
//! 4. any rental at all (all expired): `RentExpired`
//! 5. otherwise: `NotEntitled`

use crate::config::RentalTerms;
use crate::core::traits::{AccountStore, CatalogStore};
use crate::types::{
    Book, BookId, BookstoreError, EntitlementStatus, Price, Tier, Transaction, UserId,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Status granted by a user's ledger history alone (steps 2 to 5)
///
/// Several active rentals should not exist, but if they do the most recent
/// one decides the reported tier.
pub fn ledger_status(
    history: &[Transaction],
    now: DateTime<Utc>,
    terms: &RentalTerms,
) -> EntitlementStatus {
    if history.iter().any(|tx| tx.tier == Tier::Buy) {
        return EntitlementStatus::Buy;
    }

    let active_rental = history
        .iter()
        .filter(|tx| tx.tier.is_rental() && tx.is_active_at(now, terms))
        .max_by_key(|tx| tx.date_buy);
    if let Some(tx) = active_rental {
        return EntitlementStatus::from_tier(tx.tier);
    }

    if history.iter().any(|tx| tx.tier.is_rental()) {
        EntitlementStatus::RentExpired
    } else {
        EntitlementStatus::NotEntitled
    }
}

/// Full resolution for one book
pub fn derive_status(
    book: &Book,
    price: &Price,
    history: &[Transaction],
    now: DateTime<Utc>,
    terms: &RentalTerms,
) -> EntitlementStatus {
    if price.is_free() && !book.hidden {
        return EntitlementStatus::Free;
    }
    ledger_status(history, now, terms)
}

/// Resolves entitlements against the catalog and ledger
pub struct EntitlementResolver<C, A> {
    catalog: Arc<C>,
    accounts: Arc<A>,
    terms: RentalTerms,
}

impl<C, A> Clone for EntitlementResolver<C, A> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            accounts: Arc::clone(&self.accounts),
            terms: self.terms,
        }
    }
}

impl<C: CatalogStore, A: AccountStore> EntitlementResolver<C, A> {
    pub fn new(catalog: Arc<C>, accounts: Arc<A>, terms: RentalTerms) -> Self {
        Self {
            catalog,
            accounts,
            terms,
        }
    }

    /// Resolve a user's status for a book at `now`
    ///
    /// # Errors
    ///
    /// - `NotFound(Book)` / `NotFound(Price)` for unknown books
    /// - `StorageFailure` from the stores
    pub fn resolve_at(
        &self,
        user: UserId,
        book: BookId,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, BookstoreError> {
        let book = self.catalog.get_book(book)?;
        let price = self.catalog.get_price(book.id)?;
        self.resolve_with(user, &book, &price, now)
    }

    /// Resolve a status when the caller already holds the book and its price
    pub fn resolve_with(
        &self,
        user: UserId,
        book: &Book,
        price: &Price,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, BookstoreError> {
        // Free books never need the ledger
        let status = if price.is_free() && !book.hidden {
            EntitlementStatus::Free
        } else {
            let history = self.accounts.list_transactions(user, book.id)?;
            derive_status(book, price, &history, now, &self.terms)
        };

        debug!(user, book = book.id, %status, "Resolved entitlement");
        Ok(status)
    }

    /// Whether the user may read the book at `now`
    pub fn is_accessible_at(
        &self,
        user: UserId,
        book: BookId,
        now: DateTime<Utc>,
    ) -> Result<bool, BookstoreError> {
        Ok(self.resolve_at(user, book, now)?.is_accessible())
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn terms(&self) -> &RentalTerms {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryAccountStore, InMemoryCatalog};
    use crate::types::{Amount, Entity, NewBook};
    use chrono::{TimeDelta, TimeZone};
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    fn tx(tier: Tier, days_ago: i64) -> Transaction {
        Transaction {
            user: 1,
            book: 1,
            date_buy: t0() - TimeDelta::days(days_ago),
            price: 10,
            tier,
        }
    }

    fn book(hidden: bool) -> Book {
        NewBook {
            title: "Book".to_string(),
            hidden,
            ..NewBook::default()
        }
        .into_book(1)
    }

    fn price(buy: Option<Amount>) -> Price {
        Price {
            book: 1,
            buy,
            rent_2week: Some(10),
            rent_month: Some(20),
            rent_3month: Some(40),
        }
    }

    #[rstest]
    #[case::empty(vec![], EntitlementStatus::NotEntitled)]
    #[case::bought(vec![tx(Tier::Buy, 400)], EntitlementStatus::Buy)]
    #[case::buy_beats_expired_rentals(
        vec![tx(Tier::Buy, 400), tx(Tier::RentMonth, 100), tx(Tier::Rent2Week, 50)],
        EntitlementStatus::Buy
    )]
    #[case::buy_beats_active_rental(
        vec![tx(Tier::Rent3Month, 1), tx(Tier::Buy, 2)],
        EntitlementStatus::Buy
    )]
    #[case::active_two_weeks(vec![tx(Tier::Rent2Week, 13)], EntitlementStatus::Rent2Week)]
    #[case::active_month(vec![tx(Tier::RentMonth, 29)], EntitlementStatus::RentMonth)]
    #[case::active_three_months(vec![tx(Tier::Rent3Month, 89)], EntitlementStatus::Rent3Month)]
    #[case::expired_two_weeks(vec![tx(Tier::Rent2Week, 14)], EntitlementStatus::RentExpired)]
    #[case::renewed_after_expiry(
        vec![tx(Tier::RentMonth, 60), tx(Tier::Rent2Week, 3)],
        EntitlementStatus::Rent2Week
    )]
    #[case::most_recent_active_wins(
        vec![tx(Tier::Rent3Month, 20), tx(Tier::RentMonth, 5)],
        EntitlementStatus::RentMonth
    )]
    fn test_ledger_status(#[case] history: Vec<Transaction>, #[case] expected: EntitlementStatus) {
        assert_eq!(ledger_status(&history, t0(), &RentalTerms::default()), expected);
    }

    #[rstest]
    #[case::free_without_history(false, Some(0), vec![], EntitlementStatus::Free)]
    #[case::free_ignores_expired_rental(false, Some(0), vec![tx(Tier::RentMonth, 90)], EntitlementStatus::Free)]
    #[case::hidden_free_book_is_not_free(true, Some(0), vec![], EntitlementStatus::NotEntitled)]
    #[case::hidden_keeps_purchases(true, Some(0), vec![tx(Tier::Buy, 3)], EntitlementStatus::Buy)]
    #[case::unpriced_is_not_free(false, None, vec![], EntitlementStatus::NotEntitled)]
    #[case::paid(false, Some(500), vec![tx(Tier::Rent2Week, 30)], EntitlementStatus::RentExpired)]
    fn test_derive_status(
        #[case] hidden: bool,
        #[case] buy: Option<Amount>,
        #[case] history: Vec<Transaction>,
        #[case] expected: EntitlementStatus,
    ) {
        let status = derive_status(&book(hidden), &price(buy), &history, t0(), &RentalTerms::default());
        assert_eq!(status, expected);
    }

    #[test]
    fn test_month_rental_boundary() {
        let history = vec![tx(Tier::RentMonth, 0)];
        let terms = RentalTerms::default();
        let end = t0() + TimeDelta::days(30);

        assert_eq!(
            ledger_status(&history, end - TimeDelta::milliseconds(1), &terms),
            EntitlementStatus::RentMonth
        );
        assert_eq!(ledger_status(&history, end, &terms), EntitlementStatus::RentExpired);
    }

    #[test]
    fn test_resolver_reads_stores() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let created = catalog.create_book(NewBook::default());
        catalog
            .set_price(created.id, Price { book: created.id, ..price(Some(500)) })
            .unwrap();
        accounts.open_wallet(1, 1000).unwrap();

        let resolver = EntitlementResolver::new(
            Arc::clone(&catalog),
            Arc::clone(&accounts),
            RentalTerms::default(),
        );
        assert_eq!(
            resolver.resolve_at(1, created.id, t0()).unwrap(),
            EntitlementStatus::NotEntitled
        );
        assert!(!resolver.is_accessible_at(1, created.id, t0()).unwrap());

        accounts
            .transact(1, created.id, |_, _| {
                Ok(Transaction {
                    user: 1,
                    book: created.id,
                    date_buy: t0(),
                    price: 500,
                    tier: Tier::Buy,
                })
            })
            .unwrap();
        assert_eq!(
            resolver.resolve_at(1, created.id, t0()).unwrap(),
            EntitlementStatus::Buy
        );
        assert!(resolver.is_accessible_at(1, created.id, t0()).unwrap());
    }

    #[test]
    fn test_resolver_unknown_book() {
        let resolver = EntitlementResolver::new(
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryAccountStore::new()),
            RentalTerms::default(),
        );
        assert_eq!(
            resolver.resolve_at(1, 42, t0()).unwrap_err(),
            BookstoreError::not_found(Entity::Book(42))
        );
    }
}
