//! Engine configuration
//!
//! Everything that used to be a process-wide constant (starting balance,
//! rental durations) is carried in [`EngineConfig`] so that tests can pin
//! the values alongside an injected clock.

use crate::types::{Amount, Tier};
use chrono::TimeDelta;

/// Balance credited to a wallet when a user registers
pub const DEFAULT_STARTING_BALANCE: Amount = 1000;

/// Largest page the administrative catalog listing hands out
pub const MAX_CATALOG_PAGE_LIMIT: usize = 100;

/// Access window of each rental tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalTerms {
    pub two_weeks: TimeDelta,
    pub month: TimeDelta,
    pub three_months: TimeDelta,
}

impl Default for RentalTerms {
    fn default() -> Self {
        Self {
            two_weeks: TimeDelta::days(14),
            month: TimeDelta::days(30),
            three_months: TimeDelta::days(90),
        }
    }
}

impl RentalTerms {
    /// Access window of a tier; `None` for a permanent purchase
    pub fn duration(&self, tier: Tier) -> Option<TimeDelta> {
        match tier {
            Tier::Buy => None,
            Tier::Rent2Week => Some(self.two_weeks),
            Tier::RentMonth => Some(self.month),
            Tier::Rent3Month => Some(self.three_months),
        }
    }
}

/// Configuration for the entitlement engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Balance of a newly opened wallet
    pub starting_balance: Amount,

    /// Rental windows
    pub rental_terms: RentalTerms,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            rental_terms: RentalTerms::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration with a custom starting balance
    pub fn with_starting_balance(starting_balance: Amount) -> Self {
        Self {
            starting_balance,
            ..Self::default()
        }
    }
}
