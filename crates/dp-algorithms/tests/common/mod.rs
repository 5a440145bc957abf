//! Shared test fixtures
//!
//! A mechanism that adds no noise, injected through `with_mechanism`, so
//! results can be compared exactly against the underlying statistic.

#![allow(dead_code)]

use dp_algorithms::{
    AlgorithmError, ConfidenceInterval, MechanismBuilder, NumericalMechanism, Result,
};

#[derive(Debug, Clone, Default)]
pub struct ZeroNoiseBuilder {
    epsilon: Option<f64>,
    delta: Option<f64>,
    l0_sensitivity: Option<f64>,
    l_inf_sensitivity: Option<f64>,
}

impl ZeroNoiseBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MechanismBuilder for ZeroNoiseBuilder {
    fn set_epsilon(&mut self, epsilon: f64) -> &mut dyn MechanismBuilder {
        self.epsilon = Some(epsilon);
        self
    }

    fn set_delta(&mut self, delta: f64) -> &mut dyn MechanismBuilder {
        self.delta = Some(delta);
        self
    }

    fn set_l0_sensitivity(&mut self, l0_sensitivity: f64) -> &mut dyn MechanismBuilder {
        self.l0_sensitivity = Some(l0_sensitivity);
        self
    }

    fn set_l_inf_sensitivity(&mut self, l_inf_sensitivity: f64) -> &mut dyn MechanismBuilder {
        self.l_inf_sensitivity = Some(l_inf_sensitivity);
        self
    }

    fn set_seed(&mut self, _seed: u64) -> &mut dyn MechanismBuilder {
        self
    }

    fn build(&self) -> Result<Box<dyn NumericalMechanism>> {
        let epsilon = self
            .epsilon
            .ok_or_else(|| AlgorithmError::Internal("epsilon never set".to_string()))?;
        Ok(Box::new(ZeroNoise {
            epsilon,
            delta: self.delta.unwrap_or(0.0),
            l0_sensitivity: self.l0_sensitivity.unwrap_or(f64::NAN),
            l_inf_sensitivity: self.l_inf_sensitivity.unwrap_or(f64::NAN),
            budgets: Vec::new(),
        }))
    }

    fn clone_box(&self) -> Box<dyn MechanismBuilder> {
        Box::new(self.clone())
    }
}

#[derive(Debug)]
pub struct ZeroNoise {
    pub epsilon: f64,
    pub delta: f64,
    pub l0_sensitivity: f64,
    pub l_inf_sensitivity: f64,
    pub budgets: Vec<f64>,
}

impl NumericalMechanism for ZeroNoise {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn delta(&self) -> f64 {
        self.delta
    }

    fn add_noise(&mut self, value: f64, privacy_budget: f64) -> Result<f64> {
        self.budgets.push(privacy_budget);
        Ok(value)
    }

    fn noise_confidence_interval(
        &self,
        confidence_level: f64,
        _privacy_budget: f64,
        noised_result: f64,
    ) -> Result<ConfidenceInterval> {
        Ok(ConfidenceInterval::centered(noised_result, 0.0, confidence_level))
    }

    fn memory_used(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}
