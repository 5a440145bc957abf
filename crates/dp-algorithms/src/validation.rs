//! Input Validation for Algorithm Parameters
//!
//! Pure checks shared by builders, mechanisms and the budget tracker.
//! Each helper takes a human readable `label` that is echoed back in the
//! error together with the rejected value.
//!
//! # Parameter Constraints
//!
//! ## Epsilon (ε)
//! - Must be finite and positive (> 0)
//!
//! ## Delta (δ)
//! - Must be in [0, 1]
//!
//! ## Contribution bounds
//! - Must be positive integers
//!
//! ## Confidence level
//! - Must be in the open interval (0, 1)
//!
//! NaN fails every check because all comparisons against it are false.

use crate::error::{AlgorithmError, Result};

/// Validate that a value is finite (not NaN, not ±∞)
pub fn validate_finite(value: f64, label: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(AlgorithmError::invalid_parameter(
            label,
            value,
            "must be finite",
        ));
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(AlgorithmError::InvalidParameter)` otherwise
pub fn validate_finite_and_positive(value: f64, label: &str) -> Result<()> {
    validate_finite(value, label)?;
    if value <= 0.0 {
        return Err(AlgorithmError::invalid_parameter(
            label,
            value,
            "must be positive",
        ));
    }
    Ok(())
}

/// Validate that `lower <= value <= upper`
pub fn validate_in_inclusive_range(value: f64, lower: f64, upper: f64, label: &str) -> Result<()> {
    if !(lower..=upper).contains(&value) {
        return Err(AlgorithmError::invalid_parameter(
            label,
            value,
            format!("must be in the inclusive interval [{}, {}]", lower, upper),
        ));
    }
    Ok(())
}

/// Validate that `lower < value < upper`
pub fn validate_in_exclusive_range(value: f64, lower: f64, upper: f64, label: &str) -> Result<()> {
    if !(value > lower && value < upper) {
        return Err(AlgorithmError::invalid_parameter(
            label,
            value,
            format!("must be in the exclusive interval ({}, {})", lower, upper),
        ));
    }
    Ok(())
}

/// Validate that an integer parameter is strictly positive
pub fn validate_positive(value: i64, label: &str) -> Result<()> {
    if value <= 0 {
        return Err(AlgorithmError::invalid_parameter(
            label,
            value,
            "must be positive",
        ));
    }
    Ok(())
}
