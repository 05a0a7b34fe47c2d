//! Append-only signal log
//!
//! The product persists signals in its own backend; the engine only needs
//! "append" and "query by target". [`SignalStore`] captures that seam and
//! [`InMemorySignalLog`] is the on-device implementation, serializable to JSON
//! so the host app can persist it between launches.

use crate::error::ComputeError;
use crate::types::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Storage the scorer reads signals from
pub trait SignalStore {
    /// Validate and append a signal
    fn append(&mut self, signal: Signal) -> Result<(), ComputeError>;

    /// All signals logged for `target` (exact, case-sensitive match)
    fn signals_for(&self, target: &str) -> Vec<Signal>;

    /// Distinct targets, sorted
    fn targets(&self) -> Vec<String>;

    /// Number of signals in the store
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Vec-backed signal log kept in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySignalLog {
    signals: Vec<Signal>,
}

impl InMemorySignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop signals older than `cutoff`, returning how many were removed
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.signals.len();
        self.signals.retain(|s| s.timestamp >= cutoff);
        let removed = before - self.signals.len();
        if removed > 0 {
            tracing::info!(removed, cutoff = %cutoff, "pruned signal log");
        }
        removed
    }

    /// Remove every signal
    pub fn clear(&mut self) {
        self.signals.clear();
    }

    /// Iterate over all signals in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    /// Load a log from JSON, validating every signal
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let log: InMemorySignalLog = serde_json::from_str(json)?;
        for signal in &log.signals {
            signal.validate()?;
        }
        Ok(log)
    }

    /// Serialize the log to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string(self).map_err(ComputeError::JsonError)
    }
}

impl SignalStore for InMemorySignalLog {
    fn append(&mut self, signal: Signal) -> Result<(), ComputeError> {
        if let Err(e) = signal.validate() {
            tracing::warn!(topic = %signal.target, error = %e, "rejected signal");
            return Err(e.into());
        }
        self.signals.push(signal);
        Ok(())
    }

    fn signals_for(&self, target: &str) -> Vec<Signal> {
        self.signals
            .iter()
            .filter(|s| s.target == target)
            .cloned()
            .collect()
    }

    fn targets(&self) -> Vec<String> {
        self.signals
            .iter()
            .map(|s| s.target.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn len(&self) -> usize {
        self.signals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::SignalType;
    use chrono::{Duration, TimeZone};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    fn make_log() -> InMemorySignalLog {
        let mut log = InMemorySignalLog::new();
        log.append(Signal::new(SignalType::Choice, "MATH", 1.0, ts(1))).unwrap();
        log.append(Signal::new(SignalType::Time, "ART", 300.0, ts(2))).unwrap();
        log.append(Signal::new(SignalType::Effort, "MATH", 6.0, ts(3))).unwrap();
        log
    }

    #[test]
    fn test_query_by_target() {
        let log = make_log();

        let math = log.signals_for("MATH");
        assert_eq!(math.len(), 2);
        assert!(math.iter().all(|s| s.target == "MATH"));

        assert!(log.signals_for("math").is_empty());
        assert!(log.signals_for("SOCIAL").is_empty());
    }

    #[test]
    fn test_targets_sorted_and_distinct() {
        let log = make_log();
        assert_eq!(log.targets(), vec!["ART".to_string(), "MATH".to_string()]);
    }

    #[test]
    fn test_append_rejects_invalid_signal() {
        let mut log = make_log();
        let result = log.append(Signal::new(SignalType::Effort, "MATH", -2.0, ts(4)));

        assert!(matches!(
            result,
            Err(ComputeError::InvalidSignal(ValidationError::NegativeValue(_)))
        ));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_prune_before() {
        let mut log = make_log();
        let removed = log.prune_before(ts(2));

        assert_eq!(removed, 1);
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|s| s.timestamp >= ts(2)));
        assert_eq!(log.prune_before(ts(1) - Duration::days(1)), 0);
    }

    #[test]
    fn test_serialization() {
        let log = make_log();
        let json = log.to_json().unwrap();
        let loaded = InMemorySignalLog::from_json(&json).unwrap();

        assert_eq!(loaded.len(), log.len());
        assert_eq!(loaded.signals_for("MATH"), log.signals_for("MATH"));
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"{ "signals": [
            { "type": "effort", "target": "MATH", "value": -1.0, "timestamp": 1709283600000 }
        ] }"#;
        assert!(InMemorySignalLog::from_json(json).is_err());
    }

    #[test]
    fn test_clear() {
        let mut log = make_log();
        log.clear();
        assert!(log.is_empty());
        assert!(log.targets().is_empty());
    }
}
