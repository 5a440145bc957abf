//! Differentially private sum of clamped values

use crate::algorithm::{Algorithm, AlgorithmCore, PrivacyParameters};
use crate::budget::ConsumedBudget;
use crate::builder::{AlgorithmBuilder, BuilderParams, ContributionBounds, ValidatedParams};
use crate::error::{AlgorithmError, Result};
use crate::mechanism::NumericalMechanism;
use crate::output::{ConfidenceInterval, Output, Summary};
use crate::validation::validate_finite;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Type tag of bounded sum summaries
pub const BOUNDED_SUM_SUMMARY_TAG: &str = "bounded_sum";

#[derive(Debug, Serialize, Deserialize)]
struct BoundedSumSummary {
    parameters: PrivacyParameters,
    contributions: ContributionBounds,
    lower: f64,
    upper: f64,
    sum: f64,
}

/// Sum of entries clamped to `[lower, upper]`
///
/// NaN entries are ignored. Since the bounds are fixed at construction the
/// noise confidence interval does not depend on the data.
#[derive(Debug)]
pub struct BoundedSum {
    core: AlgorithmCore,
    mechanism: Box<dyn NumericalMechanism>,
    contributions: ContributionBounds,
    lower: f64,
    upper: f64,
    sum: f64,
}

impl BoundedSum {
    pub fn builder() -> BoundedSumBuilder {
        BoundedSumBuilder::new()
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Noise-free sum of the clamped entries seen since the last reset
    pub fn raw_sum(&self) -> f64 {
        self.sum
    }
}

impl Algorithm<f64> for BoundedSum {
    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AlgorithmCore {
        &mut self.core
    }

    fn add_entry(&mut self, entry: f64) {
        if entry.is_nan() {
            return;
        }
        self.sum += entry.clamp(self.lower, self.upper);
    }

    fn generate_result(&mut self, budget: ConsumedBudget, confidence_level: f64) -> Result<Output> {
        let noised = self.mechanism.add_noise(self.sum, budget.fraction())?;
        let interval =
            self.mechanism
                .noise_confidence_interval(confidence_level, budget.fraction(), noised)?;
        Ok(Output::from_float(noised).with_confidence_interval(interval))
    }

    fn reset_state(&mut self) {
        self.sum = 0.0;
    }

    fn serialize(&self) -> Summary {
        Summary::pack(
            BOUNDED_SUM_SUMMARY_TAG,
            &BoundedSumSummary {
                parameters: self.core.parameters(),
                contributions: self.contributions,
                lower: self.lower,
                upper: self.upper,
                sum: self.sum,
            },
        )
        .unwrap_or_default()
    }

    /// Rejects summaries built with different (ε, δ), contribution bounds
    /// or clamping bounds
    fn merge(&mut self, summary: &Summary) -> Result<()> {
        let payload: BoundedSumSummary = summary.unpack(BOUNDED_SUM_SUMMARY_TAG)?;
        self.core.check_compatible(&payload.parameters)?;
        self.contributions.check_compatible(&payload.contributions)?;
        if payload.lower != self.lower || payload.upper != self.upper {
            return Err(AlgorithmError::IncompatibleSummary {
                expected: format!("bounds [{}, {}]", self.lower, self.upper),
                found: format!("bounds [{}, {}]", payload.lower, payload.upper),
            });
        }
        self.sum += payload.sum;
        debug!(merged = payload.sum, sum = self.sum, "merged bounded sum summary");
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

/// Builder for [`BoundedSum`]
///
/// Overrides the default sensitivity policy: one contribution can move the
/// sum by up to `max(|lower|, |upper|)`, so
/// L∞ = `max(|lower|, |upper|)` × max contributions per partition (1 if
/// unset) and L0 = max partitions contributed (1 if unset).
#[derive(Debug, Default)]
pub struct BoundedSumBuilder {
    params: BuilderParams,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl BoundedSumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    fn bounds(&self) -> Result<(f64, f64)> {
        let lower = self
            .lower
            .ok_or_else(|| AlgorithmError::invalid_parameter("Lower bound", "unset", "must be set"))?;
        let upper = self
            .upper
            .ok_or_else(|| AlgorithmError::invalid_parameter("Upper bound", "unset", "must be set"))?;
        validate_finite(lower, "Lower bound")?;
        validate_finite(upper, "Upper bound")?;
        if lower > upper {
            return Err(AlgorithmError::invalid_parameter(
                "Lower bound",
                lower,
                format!("cannot be greater than upper bound {}", upper),
            ));
        }
        Ok((lower, upper))
    }
}

impl AlgorithmBuilder for BoundedSumBuilder {
    type Algorithm = BoundedSum;

    fn params(&self) -> &BuilderParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut BuilderParams {
        &mut self.params
    }

    fn build_algorithm(&self, params: ValidatedParams<'_>) -> Result<BoundedSum> {
        let (lower, upper) = self.bounds()?;

        let contributions = params.contribution_bounds();
        let l0 = contributions.max_partitions_contributed as f64;
        let l_inf =
            lower.abs().max(upper.abs()) * contributions.max_contributions_per_partition as f64;

        let mut mechanism_builder = params.mechanism_builder();
        mechanism_builder.set_epsilon(params.epsilon());
        if let Some(delta) = params.delta() {
            mechanism_builder.set_delta(delta);
        }
        let mechanism = mechanism_builder
            .set_l0_sensitivity(l0)
            .set_l_inf_sensitivity(l_inf)
            .build()?;

        Ok(BoundedSum {
            core: params.core()?,
            mechanism,
            contributions,
            lower,
            upper,
            sum: 0.0,
        })
    }
}
