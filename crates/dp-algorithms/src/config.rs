//! Serializable algorithm configuration
//!
//! Lets pipelines keep privacy parameters next to the rest of their
//! configuration and apply them to any builder:
//!
//! ```ignore
//! let config = AlgorithmConfig::from_json(r#"{"epsilon": 0.5, "mechanism": "gaussian", "delta": 1e-6}"#)?;
//! let count = CountBuilder::<u32>::new().with_config(&config).build()?;
//! ```

use crate::builder::BuilderParams;
use crate::error::{AlgorithmError, Result};
use crate::mechanism::{GaussianMechanismBuilder, LaplaceMechanismBuilder, MechanismBuilder};
use serde::{Deserialize, Serialize};

/// Which bundled mechanism to calibrate noise with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    #[default]
    Laplace,
    Gaussian,
}

/// Builder parameters in serializable form; unset fields leave the builder untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlgorithmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_partitions_contributed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_contributions_per_partition: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<MechanismKind>,
    /// Seed for deterministic noise; reproducible runs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl AlgorithmConfig {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            AlgorithmError::invalid_parameter("Algorithm config", json, format!("is not valid: {}", e))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| AlgorithmError::Internal(format!("Config encoding failed: {}", e)))
    }

    /// Fresh mechanism builder of the kind named by `mechanism`, seeded with
    /// `seed` if set; `None` when no mechanism is named
    pub fn mechanism_builder(&self) -> Option<Box<dyn MechanismBuilder>> {
        let mut builder: Box<dyn MechanismBuilder> = match self.mechanism? {
            MechanismKind::Laplace => Box::new(LaplaceMechanismBuilder::new()),
            MechanismKind::Gaussian => Box::new(GaussianMechanismBuilder::new()),
        };
        if let Some(seed) = self.seed {
            builder.set_seed(seed);
        }
        Some(builder)
    }

    /// Overwrite every parameter this config sets
    pub fn apply(&self, params: &mut BuilderParams) {
        if let Some(epsilon) = self.epsilon {
            params.set_epsilon(epsilon);
        }
        if let Some(delta) = self.delta {
            params.set_delta(delta);
        }
        if let Some(max_partitions) = self.max_partitions_contributed {
            params.set_max_partitions_contributed(max_partitions);
        }
        if let Some(max_contributions) = self.max_contributions_per_partition {
            params.set_max_contributions_per_partition(max_contributions);
        }
        match (self.mechanism_builder(), self.seed) {
            (Some(mechanism_builder), _) => params.set_mechanism(mechanism_builder),
            // A seed alone reseeds whatever mechanism is already configured.
            (None, Some(seed)) => {
                params.mechanism_builder_mut().set_seed(seed);
            }
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = AlgorithmConfig::from_json(
            r#"{
                "epsilon": 0.5,
                "delta": 1e-6,
                "max_partitions_contributed": 2,
                "max_contributions_per_partition": 3,
                "mechanism": "gaussian",
                "seed": 42
            }"#,
        )
        .unwrap();
        assert_eq!(config.epsilon, Some(0.5));
        assert_eq!(config.delta, Some(1e-6));
        assert_eq!(config.max_partitions_contributed, Some(2));
        assert_eq!(config.max_contributions_per_partition, Some(3));
        assert_eq!(config.mechanism, Some(MechanismKind::Gaussian));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_empty_config_sets_nothing() {
        let config = AlgorithmConfig::from_json("{}").unwrap();
        assert_eq!(config, AlgorithmConfig::default());
        assert!(config.mechanism_builder().is_none());

        let mut params = BuilderParams::new();
        params.set_epsilon(2.0);
        config.apply(&mut params);
        assert_eq!(params.epsilon(), Some(2.0));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(AlgorithmConfig::from_json("{").is_err());
        assert!(AlgorithmConfig::from_json(r#"{"epsilom": 1.0}"#).is_err());
        assert!(AlgorithmConfig::from_json(r#"{"mechanism": "exponential"}"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = AlgorithmConfig {
            epsilon: Some(1.25),
            mechanism: Some(MechanismKind::Laplace),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(AlgorithmConfig::from_json(&json).unwrap(), config);
    }

    fn seed_only(seed: u64) -> AlgorithmConfig {
        AlgorithmConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_alone_reseeds_default_laplace() {
        let config = seed_only(9);
        assert!(config.mechanism_builder().is_none());

        let mut params = BuilderParams::new();
        config.apply(&mut params);
        let builder = params.mechanism_builder_mut();
        let mut a = builder.set_epsilon(1.0).build().unwrap();
        let mut b = builder.build().unwrap();
        assert_eq!(a.delta(), 0.0);
        assert_eq!(a.add_noise(0.0, 1.0).unwrap(), b.add_noise(0.0, 1.0).unwrap());
    }

    #[test]
    fn test_seed_alone_keeps_configured_gaussian() {
        let mut params = BuilderParams::new();
        params.set_mechanism(Box::new(GaussianMechanismBuilder::new()));
        seed_only(3).apply(&mut params);

        let builder = params.mechanism_builder_mut();
        builder.set_epsilon(1.0).set_delta(1e-5);
        let mut a = builder.build().unwrap();
        let mut b = builder.build().unwrap();
        // Delta is only retained by the Gaussian mechanism.
        assert_eq!(a.delta(), 1e-5);
        assert_eq!(a.add_noise(0.0, 1.0).unwrap(), b.add_noise(0.0, 1.0).unwrap());

        // Gaussian half-width z · σ, not the Laplace -ln(0.05) ≈ 3.0
        let sigma = (2.0 * (1.25f64 / 1e-5).ln()).sqrt();
        let ci = a.noise_confidence_interval(0.95, 1.0, 0.0).unwrap();
        assert!((ci.upper_bound - 1.959964 * sigma).abs() < 1e-4);
    }

    #[test]
    fn test_named_mechanism_replaces_configured_one() {
        let mut params = BuilderParams::new();
        params.set_mechanism(Box::new(GaussianMechanismBuilder::new()));
        let config = AlgorithmConfig {
            mechanism: Some(MechanismKind::Laplace),
            seed: Some(4),
            ..Default::default()
        };
        config.apply(&mut params);

        let mechanism = params
            .mechanism_builder_mut()
            .set_epsilon(1.0)
            .set_delta(1e-5)
            .build()
            .unwrap();
        assert_eq!(mechanism.delta(), 0.0);
    }
}
