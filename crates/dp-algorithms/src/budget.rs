//! Privacy Budget Accounting
//!
//! Each algorithm instance owns one [`BudgetTracker`] holding the fraction
//! of its (ε, δ) guarantee that has not yet been spent. Every partial
//! result draws from it, so an instance can never release more
//! information than its construction parameters allow, no matter how the
//! total is split across calls.
//!
//! # Budget Exhaustion
//!
//! When the fraction reaches zero no further results can be produced until
//! the instance is reset. Reset also discards all accumulated entries, so
//! the refilled budget only ever covers fresh data.

use crate::error::{AlgorithmError, Result};
use tracing::debug;

/// Budget fraction of a fresh or freshly reset instance
pub const FULL_PRIVACY_BUDGET: f64 = 1.0;

/// Proof of a successful budget consumption
///
/// Only [`BudgetTracker::consume`] can create one, which makes it the
/// entry ticket for result generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumedBudget {
    fraction: f64,
}

impl ConsumedBudget {
    /// Fraction of the total budget that was actually consumed
    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

/// Remaining privacy budget of one algorithm instance
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetTracker {
    remaining: f64,
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetTracker {
    /// Create a tracker holding the full budget
    pub fn new() -> Self {
        Self {
            remaining: FULL_PRIVACY_BUDGET,
        }
    }

    /// Remaining budget fraction in [0, 1]
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Whether no budget is left
    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Check and consume a fraction of the budget
    ///
    /// # Returns
    /// * `Ok(ConsumedBudget)` holding `old_remaining - new_remaining`
    /// * `Err(AlgorithmError::NegativeBudget)` if `requested < 0`
    /// * `Err(AlgorithmError::BudgetExceeded)` if `requested > remaining()`
    ///
    /// On error the remaining budget is left untouched.
    pub fn consume(&mut self, requested: f64) -> Result<ConsumedBudget> {
        if requested < 0.0 {
            return Err(AlgorithmError::NegativeBudget { requested });
        }
        // Written so that NaN is rejected as well.
        if !(requested <= self.remaining) {
            return Err(AlgorithmError::BudgetExceeded {
                requested,
                remaining: self.remaining,
            });
        }

        let old_remaining = self.remaining;
        self.remaining = (self.remaining - requested).max(0.0);
        let fraction = old_remaining - self.remaining;

        debug!(
            requested,
            consumed = fraction,
            remaining = self.remaining,
            "privacy budget consumed"
        );

        Ok(ConsumedBudget { fraction })
    }

    /// Restore the full budget
    pub fn reset(&mut self) {
        self.remaining = FULL_PRIVACY_BUDGET;
        debug!("privacy budget reset");
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Remaining budget stays within [0, 1] and never increases between resets
        #[test]
        fn budget_stays_in_unit_interval(
            requests in proptest::collection::vec(-0.2..0.6f64, 1..50)
        ) {
            let mut budget = BudgetTracker::new();
            let mut prev_remaining = budget.remaining();

            for requested in requests {
                let _ = budget.consume(requested);
                let current = budget.remaining();
                prop_assert!((0.0..=1.0).contains(&current), "remaining out of range: {}", current);
                prop_assert!(current <= prev_remaining, "budget increased from {} to {}", prev_remaining, current);
                prev_remaining = current;
            }
        }

        /// Over-budget requests fail and leave the tracker unchanged
        #[test]
        fn over_budget_is_rejected(
            first in 0.0..1.0f64,
            excess in 1e-9..1.0f64
        ) {
            let mut budget = BudgetTracker::new();
            budget.consume(first).unwrap();
            let before = budget.remaining();

            let result = budget.consume(before + excess);
            prop_assert!(result.is_err());
            prop_assert_eq!(budget.remaining(), before);
        }

        /// Valid requests decrease the budget by exactly the consumed amount
        #[test]
        fn valid_request_consumes_exactly(
            first in 0.0..1.0f64,
            share in 0.0..=1.0f64
        ) {
            let mut budget = BudgetTracker::new();
            budget.consume(first).unwrap();
            let before = budget.remaining();
            let requested = before * share;

            let consumed = budget.consume(requested).unwrap();
            prop_assert!((consumed.fraction() - requested).abs() < 1e-12);
            prop_assert!((before - budget.remaining() - requested).abs() < 1e-12);
        }

        /// Reset always restores the full budget
        #[test]
        fn reset_restores_full_budget(
            requests in proptest::collection::vec(0.0..0.5f64, 0..20)
        ) {
            let mut budget = BudgetTracker::new();
            for requested in requests {
                let _ = budget.consume(requested);
            }
            budget.reset();
            prop_assert_eq!(budget.remaining(), FULL_PRIVACY_BUDGET);
        }
    }
}
