//! Gaussian Mechanism for Differential Privacy
//!
//! Implements the Gaussian mechanism for achieving (ε, δ)-differential privacy.
//!
//! # Mathematical Foundation
//!
//! For a query with L2 sensitivity Δ₂f = √l0 · l_inf, the mechanism adds
//! N(0, σ²) noise with
//!
//! ```text
//! σ = Δ₂f · √(2 ln(1.25/δ')) / ε'
//! ```
//!
//! where ε' = ε · budget and δ' = δ · budget are the shares spent on this
//! release.
//!
//! # Box-Muller Transform
//!
//! ```text
//! Given U₁, U₂ ~ Uniform(0, 1):
//! Z = √(-2 ln U₁) · cos(2π U₂)  ~  N(0, 1)
//! ```

use super::{
    validate_confidence_level, validate_privacy_budget, MechanismBuilder, MechanismParams,
    NumericalMechanism,
};
use crate::error::{AlgorithmError, Result};
use crate::output::ConfidenceInterval;
use crate::validation::validate_in_exclusive_range;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Builder for [`GaussianMechanism`]
#[derive(Debug, Clone, Default)]
pub struct GaussianMechanismBuilder {
    params: MechanismParams,
}

impl GaussianMechanismBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw noise from a deterministic stream
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }
}

impl MechanismBuilder for GaussianMechanismBuilder {
    fn set_epsilon(&mut self, epsilon: f64) -> &mut dyn MechanismBuilder {
        self.params.epsilon = Some(epsilon);
        self
    }

    fn set_delta(&mut self, delta: f64) -> &mut dyn MechanismBuilder {
        self.params.delta = Some(delta);
        self
    }

    fn set_l0_sensitivity(&mut self, l0_sensitivity: f64) -> &mut dyn MechanismBuilder {
        self.params.l0_sensitivity = Some(l0_sensitivity);
        self
    }

    fn set_l_inf_sensitivity(&mut self, l_inf_sensitivity: f64) -> &mut dyn MechanismBuilder {
        self.params.l_inf_sensitivity = Some(l_inf_sensitivity);
        self
    }

    fn set_seed(&mut self, seed: u64) -> &mut dyn MechanismBuilder {
        self.params.seed = Some(seed);
        self
    }

    fn build(&self) -> Result<Box<dyn NumericalMechanism>> {
        let epsilon = self.params.epsilon()?;
        let delta = self.params.delta.unwrap_or(f64::NAN);
        validate_in_exclusive_range(delta, 0.0, 1.0, "Delta")?;
        let (l0, l_inf) = self.params.sensitivities()?;

        let l2_sensitivity = l0.sqrt() * l_inf;
        debug!(epsilon, delta, l2_sensitivity, "built Gaussian mechanism");

        Ok(Box::new(GaussianMechanism {
            epsilon,
            delta,
            l2_sensitivity,
            rng: self.params.rng(),
        }))
    }

    fn clone_box(&self) -> Box<dyn MechanismBuilder> {
        Box::new(self.clone())
    }
}

/// Gaussian mechanism for (ε, δ)-differential privacy
#[derive(Debug)]
pub struct GaussianMechanism {
    epsilon: f64,
    delta: f64,
    l2_sensitivity: f64,
    rng: ChaCha20Rng,
}

impl GaussianMechanism {
    pub fn l2_sensitivity(&self) -> f64 {
        self.l2_sensitivity
    }

    /// Standard deviation for a given budget fraction
    pub fn sigma(&self, privacy_budget: f64) -> f64 {
        let epsilon = self.epsilon * privacy_budget;
        let delta = self.delta * privacy_budget;
        self.l2_sensitivity * (2.0 * (1.25 / delta).ln()).sqrt() / epsilon
    }

    fn sample_standard_normal(&mut self) -> f64 {
        // Keep u1 away from 0 for ln()
        let u1 = self.rng.gen::<f64>().max(1e-15);
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

impl NumericalMechanism for GaussianMechanism {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn delta(&self) -> f64 {
        self.delta
    }

    fn add_noise(&mut self, value: f64, privacy_budget: f64) -> Result<f64> {
        validate_privacy_budget(privacy_budget)?;
        let sigma = self.sigma(privacy_budget);
        let noised = value + self.sample_standard_normal() * sigma;
        if !noised.is_finite() {
            return Err(AlgorithmError::Internal(format!(
                "Gaussian noise produced a non-finite result from {}",
                value
            )));
        }
        Ok(noised)
    }

    fn noise_confidence_interval(
        &self,
        confidence_level: f64,
        privacy_budget: f64,
        noised_result: f64,
    ) -> Result<ConfidenceInterval> {
        validate_confidence_level(confidence_level)?;
        validate_privacy_budget(privacy_budget)?;
        let z = Normal::new(0.0, 1.0)
            .map_err(|e| AlgorithmError::Internal(format!("Standard normal unavailable: {}", e)))?
            .inverse_cdf((1.0 + confidence_level) / 2.0);
        Ok(ConfidenceInterval::centered(
            noised_result,
            z * self.sigma(privacy_budget),
            confidence_level,
        ))
    }

    fn memory_used(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}
