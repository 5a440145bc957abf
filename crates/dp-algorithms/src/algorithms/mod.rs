//! Reference algorithms built on the [`Algorithm`](crate::Algorithm) contract
//!
//! - [`Count`]: number of entries
//! - [`BoundedSum`]: sum of entries clamped to fixed bounds

pub mod bounded_sum;
pub mod count;

pub use bounded_sum::{BoundedSum, BoundedSumBuilder, BOUNDED_SUM_SUMMARY_TAG};
pub use count::{Count, CountBuilder, COUNT_SUMMARY_TAG};
