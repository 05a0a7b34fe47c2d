//! Input adapter
//!
//! Parses signals and activity metrics from JSON arrays or NDJSON, and
//! validates signals in bulk.

use crate::error::{ComputeError, ValidationError};
use crate::types::{ActivityMetric, Signal};
use serde::de::DeserializeOwned;

/// Adapter for JSON / NDJSON engine input
pub struct InputAdapter;

impl InputAdapter {
    /// Parse a JSON array of signals
    pub fn parse_signals(json: &str) -> Result<Vec<Signal>, ComputeError> {
        parse_array(json)
    }

    /// Parse newline-delimited JSON signals
    pub fn parse_signals_ndjson(ndjson: &str) -> Result<Vec<Signal>, ComputeError> {
        parse_ndjson(ndjson)
    }

    /// Parse a JSON array of activity metrics
    pub fn parse_metrics(json: &str) -> Result<Vec<ActivityMetric>, ComputeError> {
        parse_array(json)
    }

    /// Parse newline-delimited JSON activity metrics
    pub fn parse_metrics_ndjson(ndjson: &str) -> Result<Vec<ActivityMetric>, ComputeError> {
        parse_ndjson(ndjson)
    }

    /// Validate a batch of signals, returning only the failures
    pub fn validate_signals(signals: &[Signal]) -> Vec<ValidationResult> {
        signals
            .iter()
            .enumerate()
            .filter_map(|(index, signal)| {
                signal.validate().err().map(|error| ValidationResult {
                    index,
                    signal_id: signal.signal_id.clone(),
                    error,
                })
            })
            .collect()
    }

    /// Fail on the first invalid signal
    pub fn ensure_valid(signals: &[Signal]) -> Result<(), ComputeError> {
        for signal in signals {
            signal.validate()?;
        }
        Ok(())
    }
}

/// A signal that failed validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub signal_id: Option<String>,
    pub error: ValidationError,
}

fn parse_array<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, ComputeError> {
    let items: Vec<T> = serde_json::from_str(json)?;
    Ok(items)
}

fn parse_ndjson<T: DeserializeOwned>(ndjson: &str) -> Result<Vec<T>, ComputeError> {
    let mut items = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(item) => items.push(item),
            Err(e) => {
                return Err(ComputeError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EngagementDepth, SignalType};

    #[test]
    fn test_parse_signal_array() {
        let json = r#"[
            { "type": "choice", "target": "MATH", "value": 1.0, "context": "Mission X", "timestamp": 1709283600000 },
            { "type": "time", "target": "ART", "value": 420.0, "timestamp": 1709370000000 }
        ]"#;

        let signals = InputAdapter::parse_signals(json).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].signal_type, SignalType::Time);
        assert!(signals[1].context.is_none());
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = "\n{ \"type\": \"effort\", \"target\": \"MATH\", \"value\": 8.0, \"timestamp\": 1709283600000 }\n\n";
        let signals = InputAdapter::parse_signals_ndjson(ndjson).unwrap();
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = "{ \"type\": \"effort\", \"target\": \"MATH\", \"value\": 8.0, \"timestamp\": 1709283600000 }\nnot json";
        let err = InputAdapter::parse_signals_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_unknown_signal_type_rejected() {
        let json = r#"[{ "type": "mood", "target": "MATH", "value": 1.0, "timestamp": 1709283600000 }]"#;
        assert!(InputAdapter::parse_signals(json).is_err());
    }

    #[test]
    fn test_parse_metrics() {
        let json = r#"[
            { "task_type": "puzzle", "is_completed": true, "engagement_depth": "avoidant", "emotional_feedback": "stressed" }
        ]"#;
        let metrics = InputAdapter::parse_metrics(json).unwrap();
        assert_eq!(metrics[0].engagement_depth, EngagementDepth::Avoidant);
    }

    #[test]
    fn test_validate_signals() {
        let json = r#"[
            { "type": "effort", "target": "MATH", "value": 8.0, "timestamp": 1709283600000 },
            { "type": "effort", "target": "MATH", "value": -8.0, "timestamp": 1709283600000 },
            { "type": "choice", "target": "", "value": 1.0, "timestamp": 1709283600000 }
        ]"#;
        let signals = InputAdapter::parse_signals(json).unwrap();
        let failures = InputAdapter::validate_signals(&signals);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[1].error, ValidationError::EmptyTarget);
        assert!(InputAdapter::ensure_valid(&signals).is_err());
    }
}
