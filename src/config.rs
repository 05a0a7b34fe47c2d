//! Engine configuration
//!
//! Every constant the scorer and classifier use lives here with the product
//! defaults. Configs deserialize from JSON with per-field defaults, so a
//! partial file only overrides what it names.

use crate::error::ComputeError;
use crate::types::SignalType;
use serde::{Deserialize, Serialize};

/// How the scorer fills `dominant_signal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "signal")]
pub enum DominantSignalPolicy {
    /// Always report the given type
    Fixed(SignalType),
    /// Report the type with the largest decayed contribution
    Computed,
}

impl Default for DominantSignalPolicy {
    fn default() -> Self {
        DominantSignalPolicy::Fixed(SignalType::Time)
    }
}

/// Interest scorer constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight retained per elapsed week (0 < base <= 1)
    pub decay_base: f64,
    /// Points per choice signal
    pub choice_points: f64,
    /// Points per minute of time-on-task
    pub points_per_minute: f64,
    /// Minutes above which a time signal raises the multiplier
    pub long_session_minutes: f64,
    /// Multiplier increment per long session
    pub long_session_boost: f64,
    /// Points per unit of effort
    pub effort_points: f64,
    /// Emotion intensity above which a signal scores
    pub emotion_threshold: f64,
    /// Points per strong emotion signal
    pub emotion_points: f64,
    /// Scores below this are always neutral
    pub neutral_below: f64,
    /// Scores above this trend as high interest
    pub high_interest_above: f64,
    /// Whole weeks required for confirmation
    pub confirm_min_weeks: i64,
    /// Distinct sources required for confirmation
    pub confirm_min_sources: usize,
    /// Dominant signal reporting
    pub dominant_signal: DominantSignalPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decay_base: 0.9,
            choice_points: 5.0,
            points_per_minute: 0.5,
            long_session_minutes: 5.0,
            long_session_boost: 0.1,
            effort_points: 3.0,
            emotion_threshold: 0.8,
            emotion_points: 2.0,
            neutral_below: 10.0,
            high_interest_above: 50.0,
            confirm_min_weeks: 4,
            confirm_min_sources: 3,
            dominant_signal: DominantSignalPolicy::default(),
        }
    }
}

impl ScoringConfig {
    /// Reject values that would break the score's invariants
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !(self.decay_base > 0.0 && self.decay_base <= 1.0) {
            return Err(ComputeError::InvalidConfig(format!(
                "decay_base must be in (0, 1], got {}",
                self.decay_base
            )));
        }
        let weights = [
            ("choice_points", self.choice_points),
            ("points_per_minute", self.points_per_minute),
            ("long_session_boost", self.long_session_boost),
            ("effort_points", self.effort_points),
            ("emotion_points", self.emotion_points),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let thresholds = [
            ("long_session_minutes", self.long_session_minutes),
            ("emotion_threshold", self.emotion_threshold),
            ("neutral_below", self.neutral_below),
            ("high_interest_above", self.high_interest_above),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.confirm_min_weeks < 0 {
            return Err(ComputeError::InvalidConfig(
                "confirm_min_weeks must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Archetype classifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Avoidance frequency above which the child is a negotiator
    pub negotiator_avoidance_above: f64,
    /// Completion rate above which the child is a builder
    pub builder_completion_above: f64,
    /// Completion rate below which a calm child is an observer
    pub observer_completion_below: f64,
    /// Placeholder completion speed
    pub completion_speed_placeholder: f64,
    /// Placeholder reward sensitivity
    pub reward_sensitivity_placeholder: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            negotiator_avoidance_above: 0.3,
            builder_completion_above: 0.7,
            observer_completion_below: 0.4,
            completion_speed_placeholder: 0.5,
            reward_sensitivity_placeholder: 0.5,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ComputeError> {
        let fractions = [
            ("negotiator_avoidance_above", self.negotiator_avoidance_above),
            ("builder_completion_above", self.builder_completion_above),
            ("observer_completion_below", self.observer_completion_below),
            ("completion_speed_placeholder", self.completion_speed_placeholder),
            ("reward_sensitivity_placeholder", self.reward_sensitivity_placeholder),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Combined engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub classifier: ClassifierConfig,
}

impl EngineConfig {
    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        self.scoring.validate()?;
        self.classifier.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "scoring": { "decay_base": 0.8 } }"#;
        let config = EngineConfig::from_json(json).unwrap();

        assert_eq!(config.scoring.decay_base, 0.8);
        assert_eq!(config.scoring.choice_points, 5.0);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_dominant_signal_policy_json() {
        let json = r#"{ "scoring": { "dominant_signal": { "mode": "computed" } } }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.scoring.dominant_signal, DominantSignalPolicy::Computed);

        let json = r#"{ "scoring": { "dominant_signal": { "mode": "fixed", "signal": "choice" } } }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(
            config.scoring.dominant_signal,
            DominantSignalPolicy::Fixed(SignalType::Choice)
        );
    }

    #[test]
    fn test_invalid_decay_base_rejected() {
        let result = EngineConfig::from_json(r#"{ "scoring": { "decay_base": 1.5 } }"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));

        let result = EngineConfig::from_json(r#"{ "scoring": { "decay_base": 0.0 } }"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = EngineConfig::from_json(r#"{ "scoring": { "effort_points": -3.0 } }"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = ScoringConfig {
            neutral_below: f64::NAN,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(ComputeError::InvalidConfig(_))));

        let config = ScoringConfig {
            long_session_minutes: f64::INFINITY,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_classifier_threshold_out_of_range() {
        let result =
            EngineConfig::from_json(r#"{ "classifier": { "builder_completion_above": 2.0 } }"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = EngineConfig::default();
        config.scoring.dominant_signal = DominantSignalPolicy::Computed;

        let json = config.to_json().unwrap();
        let loaded = EngineConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }
}
