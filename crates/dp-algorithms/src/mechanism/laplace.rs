//! Laplace Mechanism for Differential Privacy
//!
//! Implements the classic Laplace mechanism for achieving (ε, 0)-differential privacy.
//!
//! # Mathematical Foundation
//!
//! A query whose result changes by at most Δf = l0 · l_inf when one entity's
//! contributions are removed is protected by adding noise drawn from
//!
//! ```text
//! Lap(0, b),  b = Δf / (ε · budget)
//! ```
//!
//! where `budget` is the fraction of ε spent on this release.
//!
//! # Inverse CDF Sampling
//!
//! For U ~ Uniform(-0.5, 0.5):
//!
//! ```text
//! X = -b · sign(U) · ln(1 - 2|U|)  ~  Lap(0, b)
//! ```
//!
//! # Confidence Interval
//!
//! P(|X| ≤ x) = 1 - e^(-x/b), so the interval at level c has half-width
//! `-b · ln(1 - c)`.

use super::{
    validate_confidence_level, validate_privacy_budget, MechanismBuilder, MechanismParams,
    NumericalMechanism,
};
use crate::error::{AlgorithmError, Result};
use crate::output::ConfidenceInterval;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, warn};

/// Builder for [`LaplaceMechanism`]
#[derive(Debug, Clone, Default)]
pub struct LaplaceMechanismBuilder {
    params: MechanismParams,
}

impl LaplaceMechanismBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw noise from a deterministic stream
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }
}

impl MechanismBuilder for LaplaceMechanismBuilder {
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
        let (l0, l_inf) = self.params.sensitivities()?;

        if let Some(delta) = self.params.delta {
            if delta != 0.0 {
                warn!(delta, "Laplace mechanism provides pure ε-DP; delta is ignored");
            }
        }

        let sensitivity = l0 * l_inf;
        let diversity = sensitivity / epsilon;
        if !diversity.is_finite() {
            return Err(AlgorithmError::invalid_parameter(
                "Laplace diversity (sensitivity / epsilon)",
                diversity,
                "must be finite",
            ));
        }
        debug!(epsilon, sensitivity, diversity, "built Laplace mechanism");

        Ok(Box::new(LaplaceMechanism {
            epsilon,
            sensitivity,
            diversity,
            rng: self.params.rng(),
        }))
    }

    fn clone_box(&self) -> Box<dyn MechanismBuilder> {
        Box::new(self.clone())
    }
}

/// Laplace mechanism for (ε, 0)-differential privacy
#[derive(Debug)]
pub struct LaplaceMechanism {
    epsilon: f64,
    sensitivity: f64,
    /// Noise scale when the full budget is spent
    diversity: f64,
    rng: ChaCha20Rng,
}

impl LaplaceMechanism {
    /// L1 sensitivity (l0 · l_inf)
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Scale parameter b for a given budget fraction
    pub fn scale(&self, privacy_budget: f64) -> f64 {
        self.diversity / privacy_budget
    }

    /// Sample from Laplace(0, scale)
    fn sample(&mut self, scale: f64) -> f64 {
        let u = loop {
            let centered = self.rng.gen::<f64>() - 0.5;
            // ln(1 - 2|u|) diverges at |u| = 0.5 and yields a signless 0 at u = 0
            if centered.abs() > 1e-15 && centered.abs() < 0.5 {
                break centered;
            }
        };
        -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
    }
}

impl NumericalMechanism for LaplaceMechanism {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn delta(&self) -> f64 {
        0.0
    }

    fn add_noise(&mut self, value: f64, privacy_budget: f64) -> Result<f64> {
        validate_privacy_budget(privacy_budget)?;
        let noise = self.sample(self.scale(privacy_budget));
        let noised = value + noise;
        if !noised.is_finite() {
            return Err(AlgorithmError::Internal(format!(
                "Laplace noise produced a non-finite result from {}",
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
        let half_width = -self.scale(privacy_budget) * (1.0 - confidence_level).ln();
        Ok(ConfidenceInterval::centered(
            noised_result,
            half_width,
            confidence_level,
        ))
    }

    fn memory_used(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}
