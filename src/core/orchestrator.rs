//! Purchase and rental orchestration
//!
//! This module provides the `PurchaseOrchestrator`, the only component that
//! writes to wallets and the ledger.
//!
//! The orchestrator enforces, in order:
//! 1. the book exists
//! 2. the book is not hidden
//! 3. the action is a known tier token
//! 4. the tier has a positive price
//! 5. the user has a wallet
//! 6. the balance covers the price
//! 7. the user holds no active purchase or rental of the book
//!
//! Steps 5 to 7 and the commit run inside one [`AccountStore::transact`]
//! unit of work, so concurrent requests for the same user cannot both pass
//! the entitlement check. Rejected requests have no side effects and are
//! never retried.

use crate::config::RentalTerms;
use crate::core::resolver::ledger_status;
use crate::core::traits::{AccountStore, CatalogStore};
use crate::types::{
    BookId, BookstoreError, Tier, Transaction, UnavailableReason, UserId,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Validates and commits purchases and rentals
pub struct PurchaseOrchestrator<C, A> {
    catalog: Arc<C>,
    accounts: Arc<A>,
    terms: RentalTerms,
}

impl<C, A> Clone for PurchaseOrchestrator<C, A> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            accounts: Arc::clone(&self.accounts),
            terms: self.terms,
        }
    }
}

impl<C: CatalogStore, A: AccountStore> PurchaseOrchestrator<C, A> {
    pub fn new(catalog: Arc<C>, accounts: Arc<A>, terms: RentalTerms) -> Self {
        Self {
            catalog,
            accounts,
            terms,
        }
    }

    /// Buy or rent a book at `now`
    ///
    /// # Arguments
    ///
    /// * `user` - The buyer
    /// * `book` - The book to buy or rent
    /// * `action` - One of `buy`, `rent_2week`, `rent_month`, `rent_3month`
    /// * `now` - Commit instant, recorded as the transaction's `date_buy`
    ///
    /// # Returns
    ///
    /// The committed transaction
    ///
    /// # Errors
    ///
    /// - `NotFound(Book)` if the book does not exist
    /// - `Unavailable(Hidden)` if the book is hidden
    /// - `InvalidArgument(action)` for an unknown action token
    /// - `NotFound(Price)` if the book has no price record
    /// - `Unavailable(NotForSale)` if the tier price is zero or unset
    /// - `NotFound(Wallet)` if the user has no wallet
    /// - `InsufficientFunds` if the balance does not cover the price
    /// - `AlreadyEntitled` if a purchase or unexpired rental already exists
    /// - `StorageFailure` if the commit fails; nothing is written
    pub fn execute_at(
        &self,
        user: UserId,
        book: BookId,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, BookstoreError> {
        let book = self.catalog.get_book(book)?;
        if book.hidden {
            return Err(BookstoreError::unavailable(book.id, UnavailableReason::Hidden));
        }

        let tier: Tier = action.parse()?;

        let price = self
            .catalog
            .get_price(book.id)?
            .chargeable(tier)
            .ok_or_else(|| BookstoreError::unavailable(book.id, UnavailableReason::NotForSale))?;

        let terms = self.terms;
        let transaction = self.accounts.transact(user, book.id, |wallet, history| {
            if wallet.balance < price {
                return Err(BookstoreError::insufficient_funds(
                    user,
                    wallet.balance,
                    price,
                ));
            }

            let status = ledger_status(history, now, &terms);
            if status.is_active_transaction() {
                return Err(BookstoreError::already_entitled(user, book.id, status));
            }

            Ok(Transaction {
                user,
                book: book.id,
                date_buy: now,
                price,
                tier,
            })
        })?;

        info!(user, book = book.id, %tier, price, "Committed transaction");
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryAccountStore, InMemoryCatalog};
    use crate::types::{Amount, Entity, NewBook, Price, Wallet};
    use chrono::{TimeDelta, TimeZone};
    use rstest::rstest;
    use std::thread;

    struct Fixture {
        catalog: Arc<InMemoryCatalog>,
        accounts: Arc<InMemoryAccountStore>,
        orchestrator: PurchaseOrchestrator<InMemoryCatalog, InMemoryAccountStore>,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()
    }

    fn fixture(balance: Amount) -> Fixture {
        let catalog = Arc::new(InMemoryCatalog::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let book = catalog.create_book(NewBook {
            title: "Priced".to_string(),
            ..NewBook::default()
        });
        catalog
            .set_price(
                book.id,
                Price {
                    book: book.id,
                    buy: Some(500),
                    rent_2week: Some(50),
                    rent_month: Some(0),
                    rent_3month: None,
                },
            )
            .unwrap();
        accounts.open_wallet(1, balance).unwrap();

        let orchestrator = PurchaseOrchestrator::new(
            Arc::clone(&catalog),
            Arc::clone(&accounts),
            RentalTerms::default(),
        );
        Fixture {
            catalog,
            accounts,
            orchestrator,
        }
    }

    impl Fixture {
        fn balance(&self) -> Amount {
            self.accounts.get_wallet(1).unwrap().balance
        }

        fn ledger_len(&self) -> usize {
            self.accounts.list_transactions(1, 1).unwrap().len()
        }
    }

    #[test]
    fn test_buy_then_buy_again() {
        let f = fixture(1000);

        let tx = f.orchestrator.execute_at(1, 1, "buy", t0()).unwrap();
        assert_eq!(tx.tier, Tier::Buy);
        assert_eq!(tx.price, 500);
        assert_eq!(tx.date_buy, t0());
        assert_eq!(f.balance(), 500);

        let err = f.orchestrator.execute_at(1, 1, "buy", t0()).unwrap_err();
        assert_eq!(
            err,
            BookstoreError::already_entitled(1, 1, crate::types::EntitlementStatus::Buy)
        );
        assert_eq!(f.balance(), 500);
        assert_eq!(f.ledger_len(), 1);
    }

    #[test]
    fn test_purchase_blocks_rentals_forever() {
        let f = fixture(1000);
        f.orchestrator.execute_at(1, 1, "buy", t0()).unwrap();

        let later = t0() + TimeDelta::days(3650);
        let err = f.orchestrator.execute_at(1, 1, "rent_2week", later).unwrap_err();
        assert!(matches!(err, BookstoreError::AlreadyEntitled { .. }));
    }

    #[test]
    fn test_rental_can_be_renewed_after_expiry() {
        let f = fixture(1000);
        f.orchestrator.execute_at(1, 1, "rent_2week", t0()).unwrap();

        let during = t0() + TimeDelta::days(13);
        let err = f.orchestrator.execute_at(1, 1, "rent_2week", during).unwrap_err();
        assert!(matches!(err, BookstoreError::AlreadyEntitled { .. }));

        let after = t0() + TimeDelta::days(14);
        f.orchestrator.execute_at(1, 1, "rent_2week", after).unwrap();

        assert_eq!(f.balance(), 900);
        assert_eq!(f.ledger_len(), 2);
    }

    #[test]
    fn test_active_rental_blocks_purchase() {
        let f = fixture(1000);
        f.orchestrator.execute_at(1, 1, "rent_2week", t0()).unwrap();

        let err = f.orchestrator.execute_at(1, 1, "buy", t0()).unwrap_err();
        assert_eq!(
            err,
            BookstoreError::already_entitled(1, 1, crate::types::EntitlementStatus::Rent2Week)
        );
    }

    #[test]
    fn test_insufficient_funds_leaves_no_trace() {
        let f = fixture(40);

        let err = f.orchestrator.execute_at(1, 1, "rent_2week", t0()).unwrap_err();

        assert_eq!(err, BookstoreError::insufficient_funds(1, 40, 50));
        assert_eq!(f.balance(), 40);
        assert_eq!(f.ledger_len(), 0);
    }

    #[test]
    fn test_hidden_book_is_unavailable_for_every_action() {
        let f = fixture(1000);
        f.catalog.set_hidden(1, true).unwrap();

        for action in ["buy", "rent_2week", "rent_month", "rent_3month", "lease"] {
            assert_eq!(
                f.orchestrator.execute_at(1, 1, action, t0()).unwrap_err(),
                BookstoreError::unavailable(1, UnavailableReason::Hidden)
            );
        }
    }

    #[rstest]
    #[case::unknown_book(9, "buy", BookstoreError::not_found(Entity::Book(9)))]
    #[case::invalid_action(1, "lease", BookstoreError::invalid_argument("action", "lease"))]
    #[case::zero_tier_price(1, "rent_month", BookstoreError::unavailable(1, UnavailableReason::NotForSale))]
    #[case::unset_tier_price(1, "rent_3month", BookstoreError::unavailable(1, UnavailableReason::NotForSale))]
    fn test_preconditions(
        #[case] book: BookId,
        #[case] action: &str,
        #[case] expected: BookstoreError,
    ) {
        let f = fixture(1000);
        assert_eq!(f.orchestrator.execute_at(1, book, action, t0()).unwrap_err(), expected);
        assert_eq!(f.balance(), 1000);
    }

    #[test]
    fn test_free_book_cannot_be_bought() {
        let f = fixture(1000);
        let free = f.catalog.create_book(NewBook::default());

        assert_eq!(
            f.orchestrator.execute_at(1, free.id, "buy", t0()).unwrap_err(),
            BookstoreError::unavailable(free.id, UnavailableReason::NotForSale)
        );
    }

    #[test]
    fn test_missing_wallet() {
        let f = fixture(1000);
        assert_eq!(
            f.orchestrator.execute_at(2, 1, "buy", t0()).unwrap_err(),
            BookstoreError::not_found(Entity::Wallet(2))
        );
    }

    #[test]
    fn test_funds_are_checked_before_entitlement() {
        let f = fixture(520);
        f.orchestrator.execute_at(1, 1, "buy", t0()).unwrap();

        // Balance 20 cannot cover 500 and the book is already owned; funds win
        let err = f.orchestrator.execute_at(1, 1, "buy", t0()).unwrap_err();
        assert_eq!(err, BookstoreError::insufficient_funds(1, 20, 500));
    }

    #[test]
    fn test_balance_equals_initial_minus_payments() {
        let f = fixture(1000);
        let second = f.catalog.create_book(NewBook::default());
        f.catalog
            .set_price(
                second.id,
                Price {
                    book: second.id,
                    buy: Some(120),
                    rent_2week: Some(15),
                    rent_month: Some(30),
                    rent_3month: Some(70),
                },
            )
            .unwrap();

        let mut paid = 0;
        for (book, action, days) in [
            (1, "rent_2week", 0),
            (second.id, "rent_month", 0),
            (1, "rent_2week", 20),
            (second.id, "buy", 40),
        ] {
            let tx = f
                .orchestrator
                .execute_at(1, book, action, t0() + TimeDelta::days(days))
                .unwrap();
            paid += tx.price;
        }

        assert_eq!(paid, 50 + 30 + 50 + 120);
        assert_eq!(f.balance(), 1000 - paid);
    }

    #[test]
    fn test_concurrent_purchases_commit_once() {
        let f = fixture(600);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let orchestrator = f.orchestrator.clone();
                thread::spawn(move || orchestrator.execute_at(1, 1, "buy", t0()))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let committed = results.iter().filter(|r| r.is_ok()).count();

        assert_eq!(committed, 1);
        for result in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                result,
                BookstoreError::AlreadyEntitled { .. } | BookstoreError::InsufficientFunds { .. }
            ));
        }
        assert_eq!(f.accounts.get_wallet(1).unwrap(), Wallet::new(1, 100));
        assert_eq!(f.ledger_len(), 1);
    }
}
