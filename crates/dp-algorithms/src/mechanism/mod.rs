//! Noise Mechanisms
//!
//! Algorithms never sample noise themselves. They configure a
//! [`MechanismBuilder`] with epsilon, delta and the two contribution
//! sensitivities, build a [`NumericalMechanism`], and hand it the raw
//! statistic together with the budget fraction being spent.
//!
//! - [`LaplaceMechanism`] for (ε, 0)-DP, the default
//! - [`GaussianMechanism`] for (ε, δ)-DP
//!
//! Both draw from a ChaCha20 stream that is seeded from OS entropy unless a
//! seed is supplied for reproducible runs.

use crate::error::Result;
use crate::output::ConfidenceInterval;
use crate::validation::{validate_finite_and_positive, validate_in_exclusive_range};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fmt;

pub mod gaussian;
pub mod laplace;

pub use gaussian::{GaussianMechanism, GaussianMechanismBuilder};
pub use laplace::{LaplaceMechanism, LaplaceMechanismBuilder};

/// A configured source of calibrated noise
pub trait NumericalMechanism: fmt::Debug {
    fn epsilon(&self) -> f64;

    fn delta(&self) -> f64;

    /// Add noise to `value`, spending `privacy_budget` (in (0, 1]) of the
    /// mechanism's epsilon and delta
    fn add_noise(&mut self, value: f64, privacy_budget: f64) -> Result<f64>;

    /// Interval around `noised_result` that contains the true value with
    /// probability `confidence_level`, for noise drawn with `privacy_budget`
    fn noise_confidence_interval(
        &self,
        confidence_level: f64,
        privacy_budget: f64,
        noised_result: f64,
    ) -> Result<ConfidenceInterval>;

    /// Estimated resident bytes
    fn memory_used(&self) -> usize;
}

/// Configurable, cloneable factory for a [`NumericalMechanism`]
///
/// Setters return the builder so calls can be chained, including through a
/// `Box<dyn MechanismBuilder>`.
pub trait MechanismBuilder: fmt::Debug {
    fn set_epsilon(&mut self, epsilon: f64) -> &mut dyn MechanismBuilder;

    fn set_delta(&mut self, delta: f64) -> &mut dyn MechanismBuilder;

    /// Maximum number of partitions one entity contributes to
    fn set_l0_sensitivity(&mut self, l0_sensitivity: f64) -> &mut dyn MechanismBuilder;

    /// Maximum contribution of one entity to a single partition
    fn set_l_inf_sensitivity(&mut self, l_inf_sensitivity: f64) -> &mut dyn MechanismBuilder;

    /// Draw noise from a deterministic stream; builders without a seedable
    /// source may ignore it
    fn set_seed(&mut self, seed: u64) -> &mut dyn MechanismBuilder;

    fn build(&self) -> Result<Box<dyn NumericalMechanism>>;

    /// Deep copy into a fresh, independently owned builder
    fn clone_box(&self) -> Box<dyn MechanismBuilder>;
}

impl Clone for Box<dyn MechanismBuilder> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Settings shared by the bundled mechanism builders
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MechanismParams {
    pub epsilon: Option<f64>,
    pub delta: Option<f64>,
    pub l0_sensitivity: Option<f64>,
    pub l_inf_sensitivity: Option<f64>,
    pub seed: Option<u64>,
}

impl MechanismParams {
    /// Validated epsilon; mechanisms cannot be built without one
    pub fn epsilon(&self) -> Result<f64> {
        let epsilon = self.epsilon.unwrap_or(f64::NAN);
        validate_finite_and_positive(epsilon, "Epsilon")?;
        Ok(epsilon)
    }

    /// Validated (l0, l_inf), each defaulting to 1
    pub fn sensitivities(&self) -> Result<(f64, f64)> {
        let l0 = self.l0_sensitivity.unwrap_or(1.0);
        let l_inf = self.l_inf_sensitivity.unwrap_or(1.0);
        validate_finite_and_positive(l0, "L0 sensitivity")?;
        validate_finite_and_positive(l_inf, "LInf sensitivity")?;
        Ok((l0, l_inf))
    }

    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

/// Budget handed to a mechanism must lie in (0, 1]
pub(crate) fn validate_privacy_budget(privacy_budget: f64) -> Result<()> {
    validate_finite_and_positive(privacy_budget, "Privacy budget")?;
    if privacy_budget > 1.0 {
        return Err(crate::error::AlgorithmError::invalid_parameter(
            "Privacy budget",
            privacy_budget,
            "must be at most 1",
        ));
    }
    Ok(())
}

pub(crate) fn validate_confidence_level(confidence_level: f64) -> Result<()> {
    validate_in_exclusive_range(confidence_level, 0.0, 1.0, "Confidence level")
}
