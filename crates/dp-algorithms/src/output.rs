//! Algorithm outputs and portable summaries

use crate::error::{AlgorithmError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Interval expected to contain the added noise with `confidence_level` probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence_level: f64,
}

impl ConfidenceInterval {
    /// Interval of `half_width` on each side of `center`
    pub fn centered(center: f64, half_width: f64, confidence_level: f64) -> Self {
        Self {
            lower_bound: center - half_width,
            upper_bound: center + half_width,
            confidence_level,
        }
    }

    /// Whether `value` lies within the bounds (inclusive)
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

/// Value released by an algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    Int(i64),
    Float(f64),
}

impl OutputValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            OutputValue::Int(v) => *v as f64,
            OutputValue::Float(v) => *v,
        }
    }
}

/// Result of a partial result call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub value: OutputValue,
    /// Bounds on the noise added while producing `value`
    pub noise_confidence_interval: Option<ConfidenceInterval>,
}

impl Output {
    pub fn from_int(value: i64) -> Self {
        Self {
            value: OutputValue::Int(value),
            noise_confidence_interval: None,
        }
    }

    pub fn from_float(value: f64) -> Self {
        Self {
            value: OutputValue::Float(value),
            noise_confidence_interval: None,
        }
    }

    /// Attach a noise confidence interval
    pub fn with_confidence_interval(mut self, interval: ConfidenceInterval) -> Self {
        self.noise_confidence_interval = Some(interval);
        self
    }

    pub fn as_f64(&self) -> f64 {
        self.value.as_f64()
    }
}

/// Portable snapshot of the accumulated, not yet noised, state of an algorithm
///
/// The `type_tag` names the algorithm that produced the payload. A summary
/// with no `data` is the distinguished "no data" value that merges reject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub type_tag: String,
    pub data: Option<Vec<u8>>,
}

impl Summary {
    /// Summary carrying no data
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.as_ref().map_or(true, |d| d.is_empty())
    }

    /// Encode an algorithm-specific payload under `type_tag`
    pub fn pack<P: Serialize>(type_tag: &str, payload: &P) -> Result<Self> {
        let data = serde_json::to_vec(payload)
            .map_err(|e| AlgorithmError::Internal(format!("Summary encoding failed: {}", e)))?;
        Ok(Self {
            type_tag: type_tag.to_string(),
            data: Some(data),
        })
    }

    /// Decode the payload, checking that it was produced by `expected_tag`
    pub fn unpack<P: DeserializeOwned>(&self, expected_tag: &str) -> Result<P> {
        let data = match &self.data {
            Some(data) if !data.is_empty() => data,
            _ => return Err(AlgorithmError::EmptySummary),
        };
        if self.type_tag != expected_tag {
            return Err(AlgorithmError::IncompatibleSummary {
                expected: expected_tag.to_string(),
                found: self.type_tag.clone(),
            });
        }
        serde_json::from_slice(data).map_err(|e| {
            AlgorithmError::MalformedSummary(format!("{} payload: {}", expected_tag, e))
        })
    }

    /// Serialize the envelope for persistence or transport
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| AlgorithmError::Internal(format!("Summary encoding failed: {}", e)))
    }

    /// Deserialize an envelope produced by [`Summary::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| AlgorithmError::MalformedSummary(format!("Deserialization failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        count: i64,
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::empty();
        assert!(summary.is_empty());
        assert_eq!(
            summary.unpack::<Payload>("count"),
            Err(AlgorithmError::EmptySummary)
        );
    }

    #[test]
    fn test_pack_and_unpack() {
        let summary = Summary::pack("count", &Payload { count: 7 }).unwrap();
        assert!(!summary.is_empty());
        assert_eq!(summary.unpack::<Payload>("count").unwrap(), Payload { count: 7 });
    }

    #[test]
    fn test_mismatched_tag() {
        let summary = Summary::pack("bounded_sum", &Payload { count: 7 }).unwrap();
        assert!(matches!(
            summary.unpack::<Payload>("count"),
            Err(AlgorithmError::IncompatibleSummary { .. })
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let summary = Summary {
            type_tag: "count".to_string(),
            data: Some(b"not json".to_vec()),
        };
        assert!(matches!(
            summary.unpack::<Payload>("count"),
            Err(AlgorithmError::MalformedSummary(_))
        ));
    }

    #[test]
    fn test_envelope_bytes() {
        let summary = Summary::pack("count", &Payload { count: 3 }).unwrap();
        let restored = Summary::from_bytes(&summary.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, summary);
        assert!(Summary::from_bytes(b"{").is_err());
    }

    #[test]
    fn test_confidence_interval_contains() {
        let ci = ConfidenceInterval::centered(0.0, 2.0, 0.95);
        assert!(ci.contains(1.5));
        assert!(!ci.contains(2.5));
        assert_eq!(ci.width(), 4.0);
    }
}
