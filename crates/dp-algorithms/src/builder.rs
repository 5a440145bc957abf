//! Algorithm Builders
//!
//! [`BuilderParams`] collects the parameters every algorithm shares and
//! [`AlgorithmBuilder`] supplies the fluent setters and the validating
//! [`AlgorithmBuilder::build`] on top of it. A concrete builder stores a
//! `BuilderParams`, exposes it through `params`/`params_mut`, and implements
//! the factory hook [`AlgorithmBuilder::build_algorithm`], which only ever
//! receives parameters that passed validation.
//!
//! ```ignore
//! let mut count = CountBuilder::<f64>::new()
//!     .with_epsilon(1.0)
//!     .with_max_partitions_contributed(2)
//!     .build()?;
//! ```

use crate::algorithm::{AlgorithmCore, DEFAULT_DELTA};
use crate::config::AlgorithmConfig;
use crate::error::{AlgorithmError, Result};
use crate::mechanism::{LaplaceMechanismBuilder, MechanismBuilder, NumericalMechanism};
use crate::validation::{validate_finite_and_positive, validate_in_inclusive_range, validate_positive};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Epsilon substituted when none is set: ln(3)
///
/// Only meant for tests and experiments; production callers should choose
/// epsilon from their own privacy analysis.
pub const DEFAULT_EPSILON: f64 = 1.098_612_288_668_109_8;

/// Parameters shared by all algorithm builders
#[derive(Debug, Clone)]
pub struct BuilderParams {
    epsilon: Option<f64>,
    delta: Option<f64>,
    max_partitions_contributed: Option<i64>,
    max_contributions_per_partition: Option<i64>,
    /// Custom mechanisms can be injected here, e.g. for testing
    mechanism_builder: Box<dyn MechanismBuilder>,
}

impl Default for BuilderParams {
    fn default() -> Self {
        Self {
            epsilon: None,
            delta: None,
            max_partitions_contributed: None,
            max_contributions_per_partition: None,
            mechanism_builder: Box::new(LaplaceMechanismBuilder::new()),
        }
    }
}

impl BuilderParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epsilon(&self) -> Option<f64> {
        self.epsilon
    }

    pub fn delta(&self) -> Option<f64> {
        self.delta
    }

    pub fn max_partitions_contributed(&self) -> Option<i64> {
        self.max_partitions_contributed
    }

    pub fn max_contributions_per_partition(&self) -> Option<i64> {
        self.max_contributions_per_partition
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = Some(epsilon);
    }

    pub fn set_delta(&mut self, delta: f64) {
        self.delta = Some(delta);
    }

    pub fn set_max_partitions_contributed(&mut self, max_partitions: i64) {
        self.max_partitions_contributed = Some(max_partitions);
    }

    /// Number of contributions one entity may make to any single partition
    pub fn set_max_contributions_per_partition(&mut self, max_contributions: i64) {
        self.max_contributions_per_partition = Some(max_contributions);
    }

    pub fn set_mechanism(&mut self, mechanism_builder: Box<dyn MechanismBuilder>) {
        self.mechanism_builder = mechanism_builder;
    }

    /// The configured mechanism builder, for in-place adjustments
    pub fn mechanism_builder_mut(&mut self) -> &mut dyn MechanismBuilder {
        self.mechanism_builder.as_mut()
    }

    /// Apply defaults and run the construction checks
    fn validate(&self) -> Result<ValidatedParams<'_>> {
        let epsilon = match self.epsilon {
            Some(epsilon) => epsilon,
            None => {
                warn!(
                    epsilon = DEFAULT_EPSILON,
                    "Default epsilon is being used. Consider setting your own epsilon \
                     based on privacy considerations."
                );
                DEFAULT_EPSILON
            }
        };
        validate_finite_and_positive(epsilon, "Epsilon")?;

        if let Some(delta) = self.delta {
            validate_in_inclusive_range(delta, 0.0, 1.0, "Delta")?;
        }

        if let Some(max_partitions) = self.max_partitions_contributed {
            validate_positive(
                max_partitions,
                "Maximum number of partitions that can be contributed to (i.e., L0 sensitivity)",
            )?;
        }

        if let Some(max_contributions) = self.max_contributions_per_partition {
            validate_positive(
                max_contributions,
                "Maximum number of contributions per partition",
            )?;
        }

        Ok(ValidatedParams {
            params: self,
            epsilon,
        })
    }
}

/// Contribution bounds an algorithm was built with, unset ones resolved to 1
///
/// Embedded in summaries so instances built with different bounds refuse
/// to merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBounds {
    pub max_partitions_contributed: i64,
    pub max_contributions_per_partition: i64,
}

impl ContributionBounds {
    /// Fail with `IncompatibleSummary` unless `other` matches these bounds
    pub fn check_compatible(&self, other: &ContributionBounds) -> Result<()> {
        if other != self {
            return Err(AlgorithmError::IncompatibleSummary {
                expected: self.to_string(),
                found: other.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ContributionBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "max_partitions_contributed={}, max_contributions_per_partition={}",
            self.max_partitions_contributed, self.max_contributions_per_partition
        )
    }
}

/// Builder parameters that passed validation
///
/// Only produced inside [`AlgorithmBuilder::build`]; epsilon is always
/// present, substituted with [`DEFAULT_EPSILON`] if it was never set.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedParams<'a> {
    params: &'a BuilderParams,
    epsilon: f64,
}

impl<'a> ValidatedParams<'a> {
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn delta(&self) -> Option<f64> {
        self.params.delta
    }

    pub fn max_partitions_contributed(&self) -> Option<i64> {
        self.params.max_partitions_contributed
    }

    pub fn max_contributions_per_partition(&self) -> Option<i64> {
        self.params.max_contributions_per_partition
    }

    pub fn contribution_bounds(&self) -> ContributionBounds {
        ContributionBounds {
            max_partitions_contributed: self.max_partitions_contributed().unwrap_or(1),
            max_contributions_per_partition: self.max_contributions_per_partition().unwrap_or(1),
        }
    }

    /// Fresh, independently owned copy of the configured mechanism builder
    pub fn mechanism_builder(&self) -> Box<dyn MechanismBuilder> {
        self.params.mechanism_builder.clone()
    }

    /// Core state for the algorithm under construction
    pub fn core(&self) -> Result<AlgorithmCore> {
        AlgorithmCore::new(self.epsilon, self.delta().unwrap_or(DEFAULT_DELTA))
    }

    /// Clone the mechanism builder, configure it, and build the mechanism
    ///
    /// Unset contribution bounds default to 1 for both the L0 and L∞
    /// sensitivity. Algorithms with a different sensitivity policy configure
    /// [`ValidatedParams::mechanism_builder`] themselves.
    pub fn update_and_build_mechanism(&self) -> Result<Box<dyn NumericalMechanism>> {
        let mut mechanism_builder = self.mechanism_builder();
        mechanism_builder.set_epsilon(self.epsilon);
        if let Some(delta) = self.delta() {
            mechanism_builder.set_delta(delta);
        }
        let bounds = self.contribution_bounds();
        let l0 = bounds.max_partitions_contributed;
        let l_inf = bounds.max_contributions_per_partition;
        debug!(l0, l_inf, "building mechanism");
        mechanism_builder
            .set_l0_sensitivity(l0 as f64)
            .set_l_inf_sensitivity(l_inf as f64)
            .build()
    }
}

/// Fluent, validating factory for one algorithm type
pub trait AlgorithmBuilder: Sized {
    type Algorithm;

    fn params(&self) -> &BuilderParams;

    fn params_mut(&mut self) -> &mut BuilderParams;

    /// Construct the algorithm from validated parameters
    fn build_algorithm(&self, params: ValidatedParams<'_>) -> Result<Self::Algorithm>;

    fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.params_mut().set_epsilon(epsilon);
        self
    }

    fn with_delta(mut self, delta: f64) -> Self {
        self.params_mut().set_delta(delta);
        self
    }

    fn with_max_partitions_contributed(mut self, max_partitions: i64) -> Self {
        self.params_mut().set_max_partitions_contributed(max_partitions);
        self
    }

    fn with_max_contributions_per_partition(mut self, max_contributions: i64) -> Self {
        self.params_mut()
            .set_max_contributions_per_partition(max_contributions);
        self
    }

    fn with_mechanism<M>(mut self, mechanism_builder: M) -> Self
    where
        M: MechanismBuilder + 'static,
    {
        self.params_mut().set_mechanism(Box::new(mechanism_builder));
        self
    }

    /// Overwrite the parameters that `config` sets
    fn with_config(mut self, config: &AlgorithmConfig) -> Self {
        config.apply(self.params_mut());
        self
    }

    /// Validate the parameters and construct the algorithm
    ///
    /// An unset epsilon is replaced by [`DEFAULT_EPSILON`] with a warning.
    /// Every call clones the mechanism builder, so algorithms built from
    /// the same builder share no mechanism state.
    fn build(&self) -> Result<Self::Algorithm> {
        let validated = self.params().validate()?;
        self.build_algorithm(validated)
    }
}
