//! The Differentially Private Algorithm Contract
//!
//! Every concrete algorithm implements [`Algorithm`] by supplying entry
//! ingestion, result generation, state reset, serialization, merging and
//! memory accounting. The trait's provided methods layer the privacy
//! budget protocol on top:
//!
//! ```text
//! partial_result(f, level)
//!   └─ BudgetTracker::consume(f) ──► ConsumedBudget
//!        └─ generate_result(consumed, level)   (the only place noise is drawn)
//! ```
//!
//! A result therefore always spends budget first, and the hook only ever
//! sees the fraction that was actually consumed.
//!
//! # Lifecycle
//!
//! ```text
//! Fresh ──add_entry──► Accumulating ──partial_result*──► Exhausted
//!   ▲                                                        │
//!   └────────────────────────── reset ───────────────────────┘
//! ```
//!
//! # Threading
//!
//! Instances are not meant to be shared between threads while entries are
//! added. For parallel ingestion build one instance per worker with
//! identical parameters, [`Algorithm::serialize`] each, and
//! [`Algorithm::merge`] the summaries into a single accumulator.

use crate::budget::{BudgetTracker, ConsumedBudget};
use crate::error::{AlgorithmError, Result};
use crate::output::{ConfidenceInterval, Output, Summary};
use crate::validation::{
    validate_finite_and_positive, validate_in_exclusive_range, validate_in_inclusive_range,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Confidence level used when the caller does not pick one
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Delta used when the builder leaves it unset
pub const DEFAULT_DELTA: f64 = 0.0;

/// Construction parameters shared by every algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrivacyParameters {
    pub epsilon: f64,
    pub delta: f64,
}

/// State every algorithm carries: immutable (ε, δ) and the budget tracker
#[derive(Debug, Clone)]
pub struct AlgorithmCore {
    parameters: PrivacyParameters,
    budget: BudgetTracker,
}

impl AlgorithmCore {
    /// Create the core with a full budget
    ///
    /// Fails if epsilon is not finite and positive or delta is outside [0, 1].
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        validate_finite_and_positive(epsilon, "Epsilon")?;
        validate_in_inclusive_range(delta, 0.0, 1.0, "Delta")?;
        Ok(Self {
            parameters: PrivacyParameters { epsilon, delta },
            budget: BudgetTracker::new(),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.parameters.epsilon
    }

    pub fn delta(&self) -> f64 {
        self.parameters.delta
    }

    pub fn parameters(&self) -> PrivacyParameters {
        self.parameters
    }

    pub fn remaining_privacy_budget(&self) -> f64 {
        self.budget.remaining()
    }

    /// Reject summaries produced under different (ε, δ)
    pub fn check_compatible(&self, other: &PrivacyParameters) -> Result<()> {
        if *other != self.parameters {
            return Err(AlgorithmError::IncompatibleSummary {
                expected: format!(
                    "epsilon={}, delta={}",
                    self.parameters.epsilon, self.parameters.delta
                ),
                found: format!("epsilon={}, delta={}", other.epsilon, other.delta),
            });
        }
        Ok(())
    }
}

/// A differentially private algorithm over entries of type `T`
pub trait Algorithm<T> {
    /// Shared (ε, δ) and budget state
    fn core(&self) -> &AlgorithmCore;

    fn core_mut(&mut self) -> &mut AlgorithmCore;

    /// Fold one input into the accumulated state
    fn add_entry(&mut self, entry: T);

    /// Compute the noised result over every entry added since the last reset
    ///
    /// Called by the `partial_result` family after the budget has been
    /// consumed; `budget` is the fraction actually spent.
    fn generate_result(&mut self, budget: ConsumedBudget, confidence_level: f64)
        -> Result<Output>;

    /// Discard all accumulated entries
    fn reset_state(&mut self);

    /// Snapshot of the accumulated state, or [`Summary::empty`] if the
    /// algorithm cannot be serialized
    fn serialize(&self) -> Summary;

    /// Fold a summary from an instance with identical parameters into this one
    fn merge(&mut self, summary: &Summary) -> Result<()>;

    /// Estimated resident bytes
    fn memory_used(&self) -> usize;

    /// Add inputs in iteration order
    fn add_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = T>,
        Self: Sized,
    {
        for entry in entries {
            self.add_entry(entry);
        }
    }

    /// Reset, add `entries`, and spend the whole budget on one result
    fn result<I>(&mut self, entries: I) -> Result<Output>
    where
        I: IntoIterator<Item = T>,
        Self: Sized,
    {
        self.reset();
        self.add_entries(entries);
        self.partial_result()
    }

    /// Result consuming all remaining budget
    fn partial_result(&mut self) -> Result<Output> {
        let remaining = self.remaining_privacy_budget();
        self.partial_result_with_budget(remaining)
    }

    /// Result consuming `privacy_budget` of the total budget
    fn partial_result_with_budget(&mut self, privacy_budget: f64) -> Result<Output> {
        self.partial_result_with_confidence(privacy_budget, DEFAULT_CONFIDENCE_LEVEL)
    }

    /// Result consuming `privacy_budget`, with the noise confidence interval
    /// reported at `confidence_level`
    fn partial_result_with_confidence(
        &mut self,
        privacy_budget: f64,
        confidence_level: f64,
    ) -> Result<Output> {
        // Checked up front so a bad level cannot burn budget.
        validate_in_exclusive_range(confidence_level, 0.0, 1.0, "Confidence level")?;
        if privacy_budget < 0.0 {
            return Err(AlgorithmError::NegativeBudget {
                requested: privacy_budget,
            });
        }
        // Even a zero request cannot release from a spent instance.
        if self.core().budget.is_exhausted() {
            return Err(AlgorithmError::BudgetExhausted {
                requested: privacy_budget,
            });
        }
        let consumed = self.consume_privacy_budget(privacy_budget)?;
        self.generate_result(consumed, confidence_level)
    }

    fn remaining_privacy_budget(&self) -> f64 {
        self.core().remaining_privacy_budget()
    }

    /// Draw down the budget without producing a result
    fn consume_privacy_budget(&mut self, privacy_budget: f64) -> Result<ConsumedBudget> {
        self.core_mut().budget.consume(privacy_budget)
    }

    /// Back to the fresh state: full budget, no entries
    fn reset(&mut self) {
        self.core_mut().budget.reset();
        self.reset_state();
        debug!("algorithm reset");
    }

    /// Confidence interval of the noise a result with `privacy_budget` would carry
    ///
    /// Unsupported by default. Algorithms override this only when the
    /// interval does not depend on the number of entries, so the interval
    /// itself leaks nothing about the input.
    fn noise_confidence_interval(
        &self,
        _confidence_level: f64,
        _privacy_budget: f64,
    ) -> Result<ConfidenceInterval> {
        Err(AlgorithmError::Unimplemented("noise_confidence_interval()"))
    }

    fn epsilon(&self) -> f64 {
        self.core().epsilon()
    }

    fn delta(&self) -> f64 {
        self.core().delta()
    }
}
