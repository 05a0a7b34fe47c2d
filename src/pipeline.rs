//! Pipeline orchestration
//!
//! Public entry points: one-shot JSON helpers and a stateful processor that
//! owns a signal log across calls.

use crate::adapter::InputAdapter;
use crate::archetype::ArchetypeClassifier;
use crate::config::EngineConfig;
use crate::encoder::InsightEncoder;
use crate::error::ComputeError;
use crate::interest::InterestScorer;
use crate::signal_log::{InMemorySignalLog, SignalStore};
use crate::types::{ActivityMetric, InterestResult, PsychologicalProfile, Signal};
use chrono::{DateTime, Utc};

/// Score one target from a JSON signal array (stateless, one-shot).
///
/// Signals for other targets are ignored. Returns the report JSON.
///
/// # Example
/// ```ignore
/// let report = signals_to_interest_json(signals_json, "MATH", Utc::now())?;
/// ```
pub fn signals_to_interest_json(
    signals_json: &str,
    target: &str,
    now: DateTime<Utc>,
) -> Result<String, ComputeError> {
    let signals = InputAdapter::parse_signals(signals_json)?;
    InputAdapter::ensure_valid(&signals)?;

    let matching: Vec<Signal> = signals.into_iter().filter(|s| s.target == target).collect();
    let result = InterestScorer::new().score(target, &matching, now);

    InsightEncoder::new().encode_to_json(vec![result], None)
}

/// Classify a JSON activity-metric array (stateless, one-shot).
pub fn metrics_to_profile_json(metrics_json: &str) -> Result<String, ComputeError> {
    let metrics = InputAdapter::parse_metrics(metrics_json)?;
    let profile = ArchetypeClassifier::new().analyze(&metrics);

    InsightEncoder::new().encode_to_json(Vec::new(), Some(profile))
}

/// Stateful processor holding a signal log and engine configuration.
pub struct InsightProcessor {
    log: InMemorySignalLog,
    scorer: InterestScorer,
    classifier: ArchetypeClassifier,
    encoder: InsightEncoder,
}

impl Default for InsightProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self {
            log: InMemorySignalLog::new(),
            scorer: InterestScorer::new(),
            classifier: ArchetypeClassifier::new(),
            encoder: InsightEncoder::new(),
        }
    }

    /// Create a processor with a specific configuration.
    ///
    /// Fails with `InvalidConfig` if the configuration does not validate.
    pub fn with_config(config: EngineConfig) -> Result<Self, ComputeError> {
        Ok(Self {
            log: InMemorySignalLog::new(),
            scorer: InterestScorer::with_config(config.scoring)?,
            classifier: ArchetypeClassifier::with_config(config.classifier)?,
            encoder: InsightEncoder::new(),
        })
    }

    /// Validate and append a signal to the log
    pub fn log_signal(&mut self, signal: Signal) -> Result<(), ComputeError> {
        self.log.append(signal)
    }

    /// Parse a JSON signal array and append every signal.
    ///
    /// Nothing is appended if any signal is invalid.
    pub fn log_signals_json(&mut self, json: &str) -> Result<usize, ComputeError> {
        let signals = InputAdapter::parse_signals(json)?;
        InputAdapter::ensure_valid(&signals)?;
        let count = signals.len();
        for signal in signals {
            self.log.append(signal)?;
        }
        tracing::info!(count, total = self.log.len(), "logged signals");
        Ok(count)
    }

    /// Score a single target as of `now`
    pub fn interest_for(&self, target: &str, now: DateTime<Utc>) -> InterestResult {
        let signals = self.log.signals_for(target);
        self.scorer.score(target, &signals, now)
    }

    /// Score every logged target as of `now`, sorted by target
    pub fn interests(&self, now: DateTime<Utc>) -> Vec<InterestResult> {
        self.log
            .targets()
            .iter()
            .map(|target| self.interest_for(target, now))
            .collect()
    }

    /// Classify activity metrics
    pub fn profile(&self, metrics: &[ActivityMetric]) -> PsychologicalProfile {
        self.classifier.analyze(metrics)
    }

    /// Score every target and encode the report
    pub fn report_json(
        &self,
        now: DateTime<Utc>,
        metrics: Option<&[ActivityMetric]>,
    ) -> Result<String, ComputeError> {
        let interests = self.interests(now);
        let profile = metrics.map(|m| self.profile(m));
        self.encoder.encode_to_json(interests, profile)
    }

    /// Save the signal log to JSON for persistence
    pub fn save_log(&self) -> Result<String, ComputeError> {
        self.log.to_json()
    }

    /// Replace the signal log with one loaded from JSON
    pub fn load_log(&mut self, json: &str) -> Result<(), ComputeError> {
        self.log = InMemorySignalLog::from_json(json)?;
        tracing::info!(signals = self.log.len(), "loaded signal log");
        Ok(())
    }

    /// Drop signals older than `cutoff`
    pub fn prune_log_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        self.log.prune_before(cutoff)
    }

    /// Number of signals currently logged
    pub fn signal_count(&self) -> usize {
        self.log.len()
    }

    /// Clear the signal log
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DominantSignalPolicy;
    use crate::types::{Archetype, InterestStatus, SignalType};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn sample_signals_json() -> &'static str {
        // t0 = 2024-03-01T09:00:00Z, second signal one day later
        r#"[
            { "type": "choice", "target": "MATH", "value": 1.0, "context": "Mission X", "timestamp": 1709283600000 },
            { "type": "effort", "target": "MATH", "value": 8.0, "context": "Mission Y", "timestamp": 1709370000000 },
            { "type": "time", "target": "ART", "value": 900.0, "context": "Life skills", "timestamp": 1709370000000 }
        ]"#
    }

    fn sample_metrics_json() -> &'static str {
        r#"[
            { "task_type": "puzzle", "is_completed": true, "engagement_depth": "high", "emotional_feedback": "happy" },
            { "task_type": "chores", "is_completed": true, "engagement_depth": "medium", "emotional_feedback": "neutral" },
            { "task_type": "reading", "is_completed": true, "engagement_depth": "medium", "emotional_feedback": "neutral" },
            { "task_type": "drawing", "is_completed": true, "engagement_depth": "low", "emotional_feedback": "bored" }
        ]"#
    }

    #[test]
    fn test_signals_to_interest_json() {
        let now = t0() + Duration::days(1);
        let json = signals_to_interest_json(sample_signals_json(), "MATH", now).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        let interest = &payload["interests"][0];
        assert_eq!(interest["target"], "MATH");
        assert_eq!(interest["status"], "emerging");
        assert_eq!(interest["trend"], "Emerging");
        assert_eq!(interest["breakdown"]["signal_count"], 2);
        let score = interest["score"].as_f64().unwrap();
        assert!((score - 29.0).abs() < 0.1);
    }

    #[test]
    fn test_unknown_target_scores_new() {
        let json = signals_to_interest_json(sample_signals_json(), "SOCIAL", t0()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(payload["interests"][0]["trend"], "New");
        assert_eq!(payload["interests"][0]["status"], "neutral");
    }

    #[test]
    fn test_invalid_json() {
        assert!(signals_to_interest_json("not valid json", "MATH", t0()).is_err());
        assert!(metrics_to_profile_json("not valid json").is_err());
    }

    #[test]
    fn test_invalid_signal_rejected() {
        let json = r#"[{ "type": "effort", "target": "MATH", "value": -1.0, "timestamp": 1709283600000 }]"#;
        let result = signals_to_interest_json(json, "MATH", t0());
        assert!(matches!(result, Err(ComputeError::InvalidSignal(_))));
    }

    #[test]
    fn test_metrics_to_profile_json() {
        let json = metrics_to_profile_json(sample_metrics_json()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["profile"]["archetype"], "builder");
        assert_eq!(payload["profile"]["metrics"]["preference_clusters"][0], "puzzle");
        assert!(payload["interests"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_processor_scores_all_targets() {
        let mut processor = InsightProcessor::new();
        assert_eq!(processor.log_signals_json(sample_signals_json()).unwrap(), 3);
        assert_eq!(processor.signal_count(), 3);

        let interests = processor.interests(t0() + Duration::days(1));
        let targets: Vec<&str> = interests.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["ART", "MATH"]);

        // 15 minutes: 7.5 points, multiplier 1.1
        let art = &interests[0];
        assert!((art.score - 8.25).abs() < 1e-9);
        assert_eq!(art.status, InterestStatus::Neutral);
    }

    #[test]
    fn test_processor_rejects_batch_with_invalid_signal() {
        let mut processor = InsightProcessor::new();
        let json = r#"[
            { "type": "effort", "target": "MATH", "value": 8.0, "timestamp": 1709283600000 },
            { "type": "effort", "target": "MATH", "value": -8.0, "timestamp": 1709283600000 }
        ]"#;

        assert!(processor.log_signals_json(json).is_err());
        assert_eq!(processor.signal_count(), 0);
    }

    #[test]
    fn test_processor_with_config() {
        let mut config = EngineConfig::default();
        config.scoring.dominant_signal = DominantSignalPolicy::Computed;

        let mut processor = InsightProcessor::with_config(config).unwrap();
        processor.log_signals_json(sample_signals_json()).unwrap();

        let math = processor.interest_for("MATH", t0() + Duration::days(1));
        assert_eq!(math.dominant_signal, SignalType::Effort);
    }

    #[test]
    fn test_processor_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.scoring.decay_base = 1.5;
        assert!(matches!(
            InsightProcessor::with_config(config),
            Err(ComputeError::InvalidConfig(_))
        ));

        let mut config = EngineConfig::default();
        config.classifier.builder_completion_above = -0.1;
        assert!(InsightProcessor::with_config(config).is_err());
    }

    #[test]
    fn test_log_persistence() {
        let mut processor = InsightProcessor::new();
        processor.log_signals_json(sample_signals_json()).unwrap();

        let saved = processor.save_log().unwrap();

        let mut restored = InsightProcessor::new();
        restored.load_log(&saved).unwrap();
        assert_eq!(restored.signal_count(), 3);

        let now = t0() + Duration::days(1);
        assert_eq!(
            restored.interest_for("MATH", now).score,
            processor.interest_for("MATH", now).score
        );
    }

    #[test]
    fn test_prune_and_clear() {
        let mut processor = InsightProcessor::new();
        processor.log_signals_json(sample_signals_json()).unwrap();

        assert_eq!(processor.prune_log_before(t0() + Duration::hours(1)), 1);
        assert_eq!(processor.signal_count(), 2);

        processor.clear_log();
        assert_eq!(processor.signal_count(), 0);
    }

    #[test]
    fn test_report_json_with_profile() {
        let mut processor = InsightProcessor::new();
        processor.log_signals_json(sample_signals_json()).unwrap();

        let metrics = InputAdapter::parse_metrics(sample_metrics_json()).unwrap();
        let json = processor
            .report_json(t0() + Duration::days(1), Some(metrics.as_slice()))
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["interests"].as_array().unwrap().len(), 2);
        assert_eq!(payload["profile"]["archetype"], "builder");
        assert_eq!(processor.profile(&metrics).archetype, Archetype::Builder);
    }
}
