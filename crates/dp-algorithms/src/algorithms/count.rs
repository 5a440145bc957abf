//! Differentially private count of entries

use crate::algorithm::{Algorithm, AlgorithmCore, PrivacyParameters};
use crate::budget::ConsumedBudget;
use crate::builder::{AlgorithmBuilder, BuilderParams, ContributionBounds, ValidatedParams};
use crate::error::Result;
use crate::mechanism::NumericalMechanism;
use crate::output::{ConfidenceInterval, Output, Summary};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;

/// Type tag of count summaries
pub const COUNT_SUMMARY_TAG: &str = "count";

#[derive(Debug, Serialize, Deserialize)]
struct CountSummary {
    parameters: PrivacyParameters,
    bounds: ContributionBounds,
    count: u64,
}

/// Counts entries of any type; each entry adds one regardless of its value
///
/// The noise depends only on epsilon and the contribution bounds, so the
/// noise confidence interval can be released without looking at the data.
#[derive(Debug)]
pub struct Count<T> {
    core: AlgorithmCore,
    mechanism: Box<dyn NumericalMechanism>,
    bounds: ContributionBounds,
    count: u64,
    _entry: PhantomData<fn(T)>,
}

impl<T> Count<T> {
    pub fn builder() -> CountBuilder<T> {
        CountBuilder::new()
    }

    /// Noise-free number of entries seen since the last reset
    pub fn raw_count(&self) -> u64 {
        self.count
    }
}

impl<T> Algorithm<T> for Count<T> {
    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AlgorithmCore {
        &mut self.core
    }

    fn add_entry(&mut self, _entry: T) {
        self.count = self.count.saturating_add(1);
    }

    fn generate_result(&mut self, budget: ConsumedBudget, confidence_level: f64) -> Result<Output> {
        let noised = self
            .mechanism
            .add_noise(self.count as f64, budget.fraction())?
            .round();
        let interval =
            self.mechanism
                .noise_confidence_interval(confidence_level, budget.fraction(), noised)?;
        Ok(Output::from_int(noised as i64).with_confidence_interval(interval))
    }

    fn reset_state(&mut self) {
        self.count = 0;
    }

    fn serialize(&self) -> Summary {
        Summary::pack(
            COUNT_SUMMARY_TAG,
            &CountSummary {
                parameters: self.core.parameters(),
                bounds: self.bounds,
                count: self.count,
            },
        )
        .unwrap_or_default()
    }

    /// Rejects summaries built with different (ε, δ) or contribution bounds
    fn merge(&mut self, summary: &Summary) -> Result<()> {
        let payload: CountSummary = summary.unpack(COUNT_SUMMARY_TAG)?;
        self.core.check_compatible(&payload.parameters)?;
        self.bounds.check_compatible(&payload.bounds)?;
        self.count = self.count.saturating_add(payload.count);
        debug!(merged = payload.count, count = self.count, "merged count summary");
        Ok(())
    }

    fn memory_used(&self) -> usize {
        std::mem::size_of::<Self>() + self.mechanism.memory_used()
    }

    fn noise_confidence_interval(
        &self,
        confidence_level: f64,
        privacy_budget: f64,
    ) -> Result<ConfidenceInterval> {
        self.mechanism
            .noise_confidence_interval(confidence_level, privacy_budget, 0.0)
    }
}

/// Builder for [`Count`]
///
/// Uses the default sensitivity policy: L0 = max partitions contributed,
/// L∞ = max contributions per partition, each 1 when unset.
#[derive(Debug)]
pub struct CountBuilder<T> {
    params: BuilderParams,
    _entry: PhantomData<fn(T)>,
}

impl<T> Default for CountBuilder<T> {
    fn default() -> Self {
        Self {
            params: BuilderParams::default(),
            _entry: PhantomData,
        }
    }
}

impl<T> CountBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> AlgorithmBuilder for CountBuilder<T> {
    type Algorithm = Count<T>;

    fn params(&self) -> &BuilderParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut BuilderParams {
        &mut self.params
    }

    fn build_algorithm(&self, params: ValidatedParams<'_>) -> Result<Count<T>> {
        Ok(Count {
            core: params.core()?,
            mechanism: params.update_and_build_mechanism()?,
            bounds: params.contribution_bounds(),
            count: 0,
            _entry: PhantomData,
        })
    }
}
