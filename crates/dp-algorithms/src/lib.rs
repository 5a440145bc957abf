//! Differentially Private Algorithms
//!
//! The contract every differentially private statistic in this library
//! satisfies, and the machinery that keeps it private under partial
//! releases, resets and distributed merges:
//!
//! - [`BudgetTracker`]: remaining fraction of an instance's (ε, δ)
//! - [`Algorithm`]: entry ingestion, budget-gated results, summaries
//! - [`AlgorithmBuilder`]: validated construction and mechanism setup
//! - [`mechanism`]: Laplace and Gaussian noise
//! - [`algorithms`]: reference [`Count`] and [`BoundedSum`]
//!
//! # Example
//!
//! ```
//! use dp_algorithms::{Algorithm, AlgorithmBuilder, BoundedSumBuilder};
//!
//! let mut sum = BoundedSumBuilder::new()
//!     .with_epsilon(1.0)
//!     .with_lower(0.0)
//!     .with_upper(10.0)
//!     .build()?;
//!
//! sum.add_entries(vec![1.0, 2.0, 3.0]);
//!
//! // Spend half the budget now, keep the rest for later.
//! let early = sum.partial_result_with_budget(0.5)?;
//! assert!(sum.partial_result_with_budget(0.6).is_err());
//! let late = sum.partial_result_with_budget(0.5)?;
//! assert_eq!(sum.remaining_privacy_budget(), 0.0);
//! # let _ = (early, late);
//! # Ok::<(), dp_algorithms::AlgorithmError>(())
//! ```
//!
//! # Distributed aggregation
//!
//! Instances are single-threaded. Give each worker its own instance with
//! identical parameters, then combine:
//!
//! ```
//! use dp_algorithms::{Algorithm, AlgorithmBuilder, CountBuilder};
//!
//! let builder = CountBuilder::<u32>::new().with_epsilon(1.0);
//! let mut left = builder.build()?;
//! let mut right = builder.build()?;
//! left.add_entries(vec![1, 2]);
//! right.add_entries(vec![3, 4]);
//!
//! let mut total = builder.build()?;
//! total.merge(&left.serialize())?;
//! total.merge(&right.serialize())?;
//! assert_eq!(total.raw_count(), 4);
//! # Ok::<(), dp_algorithms::AlgorithmError>(())
//! ```

pub mod algorithm;
pub mod algorithms;
pub mod budget;
pub mod builder;
pub mod config;
pub mod error;
pub mod mechanism;
pub mod output;
pub mod validation;

#[cfg(test)]
mod log_capture;

// Re-export commonly used items
pub use algorithm::{
    Algorithm, AlgorithmCore, PrivacyParameters, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_DELTA,
};
pub use algorithms::{BoundedSum, BoundedSumBuilder, Count, CountBuilder};
pub use budget::{BudgetTracker, ConsumedBudget, FULL_PRIVACY_BUDGET};
pub use builder::{
    AlgorithmBuilder, BuilderParams, ContributionBounds, ValidatedParams, DEFAULT_EPSILON,
};
pub use config::{AlgorithmConfig, MechanismKind};
pub use error::{AlgorithmError, ErrorKind, Result};
pub use mechanism::{
    GaussianMechanism, GaussianMechanismBuilder, LaplaceMechanism, LaplaceMechanismBuilder,
    MechanismBuilder, NumericalMechanism,
};
pub use output::{ConfidenceInterval, Output, OutputValue, Summary};
pub use validation::{
    validate_finite_and_positive, validate_in_exclusive_range, validate_in_inclusive_range,
    validate_positive,
};
