//! Error types for differentially private algorithms
//!
//! Every fallible operation in this crate returns [`AlgorithmError`]. The
//! variants carry the offending value and the limit it violated so misuse
//! can be diagnosed from the message alone. [`AlgorithmError::kind`] folds
//! the variants onto the three coarse categories callers usually branch on.

use thiserror::Error;

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range parameters, over-budget requests,
    /// incompatible or empty summaries
    InvalidArgument,
    /// The operation is not supported by this algorithm or configuration
    Unimplemented,
    /// Failure inside result generation (e.g. noise sampling)
    Internal,
}

/// Error type for algorithm, builder and mechanism operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgorithmError {
    /// A negative privacy budget fraction was requested
    #[error("Budget fraction must be non-negative but is {requested}")]
    NegativeBudget { requested: f64 },

    /// More budget was requested than is left on the instance
    #[error("Requested budget fraction {requested} exceeds remaining budget fraction of {remaining}")]
    BudgetExceeded { requested: f64, remaining: f64 },

    /// A result was requested after the whole budget was spent
    #[error("Privacy budget is exhausted; reset required before requesting {requested}")]
    BudgetExhausted { requested: f64 },

    /// A construction or call parameter failed validation
    #[error("{name} {reason}, but is {value}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// Merge was handed a summary without payload
    #[error("Cannot merge an empty summary")]
    EmptySummary,

    /// Merge was handed a summary from a different algorithm or configuration
    #[error("Incompatible summary: expected {expected}, found {found}")]
    IncompatibleSummary { expected: String, found: String },

    /// The summary payload could not be decoded
    #[error("Malformed summary: {0}")]
    MalformedSummary(String),

    /// The operation is not supported
    #[error("{0} unsupported for this algorithm")]
    Unimplemented(&'static str),

    /// Failure during result generation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AlgorithmError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AlgorithmError::NegativeBudget { .. }
            | AlgorithmError::BudgetExceeded { .. }
            | AlgorithmError::BudgetExhausted { .. }
            | AlgorithmError::InvalidParameter { .. }
            | AlgorithmError::EmptySummary
            | AlgorithmError::IncompatibleSummary { .. }
            | AlgorithmError::MalformedSummary(_) => ErrorKind::InvalidArgument,
            AlgorithmError::Unimplemented(_) => ErrorKind::Unimplemented,
            AlgorithmError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for an [`AlgorithmError::InvalidParameter`]
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AlgorithmError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AlgorithmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_errors_are_invalid_argument() {
        let err = AlgorithmError::BudgetExceeded {
            requested: 0.6,
            remaining: 0.5,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "Requested budget fraction 0.6 exceeds remaining budget fraction of 0.5"
        );
        assert_eq!(
            AlgorithmError::NegativeBudget { requested: -0.1 }.kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = AlgorithmError::invalid_parameter("Epsilon", 0.0, "must be positive");
        assert_eq!(err.to_string(), "Epsilon must be positive, but is 0");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            AlgorithmError::Unimplemented("NoiseConfidenceInterval()").kind(),
            ErrorKind::Unimplemented
        );
        assert_eq!(
            AlgorithmError::Internal("overflow".to_string()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(AlgorithmError::EmptySummary.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            AlgorithmError::BudgetExhausted { requested: 0.0 }.kind(),
            ErrorKind::InvalidArgument
        );
    }
}
