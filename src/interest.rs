//! Interest scoring
//!
//! Computes a weighted, time-decayed interest score for one target from its
//! logged signals, and classifies the result as neutral, emerging or confirmed.

use crate::config::{DominantSignalPolicy, ScoringConfig};
use crate::error::ComputeError;
use crate::types::{
    InterestResult, InterestStatus, ScoreBreakdown, Signal, SignalType, SourceType,
    TREND_EMERGING, TREND_HIGH_INTEREST, TREND_NEW,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// One week in milliseconds
const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Keyword table for source detection (matched case-insensitively)
const SOURCE_KEYWORDS: &[(&str, SourceType)] = &[
    ("mission", SourceType::MicroTask),
    ("life", SourceType::LifeTask),
    ("market", SourceType::LifeTask),
    ("simulation", SourceType::Simulation),
    ("scenario", SourceType::Simulation),
    ("question", SourceType::Question),
];

/// Scorer for per-target interest
#[derive(Debug, Clone, Default)]
pub struct InterestScorer {
    config: ScoringConfig,
}

impl InterestScorer {
    /// Create a scorer with the default product constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with custom constants, rejecting invalid ones
    pub fn with_config(config: ScoringConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Constants this scorer was built with
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score `target` from its signals as of `now`.
    ///
    /// Signals are expected to belong to `target` already; the scorer does not
    /// filter them. The input slice is never modified.
    pub fn score(&self, target: &str, signals: &[Signal], now: DateTime<Utc>) -> InterestResult {
        let Some(first_signal_time) = signals.iter().map(|s| s.timestamp).min() else {
            return empty_result(target);
        };
        let cfg = &self.config;

        let weeks_active = whole_weeks_between(first_signal_time, now);
        let source_types = detect_source_types(signals);

        let mut base_score = 0.0;
        let mut effort_bonus = 0.0;
        let mut time_multiplier = 1.0;
        // Decayed contribution per signal type, indexed by SignalType::index
        let mut contributions = [0.0_f64; 5];

        for signal in signals {
            let age_weight = cfg.decay_base.powf(age_in_weeks(signal.timestamp, now));

            let contribution = match signal.signal_type {
                SignalType::Choice => {
                    let points = cfg.choice_points * age_weight;
                    base_score += points;
                    points
                }
                SignalType::Time => {
                    let minutes = signal.value / 60.0;
                    if minutes > cfg.long_session_minutes {
                        time_multiplier += cfg.long_session_boost * age_weight;
                    }
                    let points = minutes * cfg.points_per_minute * age_weight;
                    base_score += points;
                    points
                }
                SignalType::Effort => {
                    let points = signal.value * cfg.effort_points * age_weight;
                    effort_bonus += points;
                    points
                }
                SignalType::Emotion => {
                    if signal.value > cfg.emotion_threshold {
                        let points = cfg.emotion_points * age_weight;
                        base_score += points;
                        points
                    } else {
                        0.0
                    }
                }
                SignalType::Temperament => 0.0,
            };
            contributions[signal.signal_type.index()] += contribution;
        }

        // Negative values are rejected when logged; clamp so score >= 0 holds anyway
        let score = ((base_score + effort_bonus) * time_multiplier).max(0.0);

        let is_confirmed =
            weeks_active >= cfg.confirm_min_weeks && source_types.len() >= cfg.confirm_min_sources;
        let status = if score < cfg.neutral_below {
            InterestStatus::Neutral
        } else if is_confirmed {
            InterestStatus::Confirmed
        } else {
            InterestStatus::Emerging
        };

        let trend = if score > cfg.high_interest_above {
            TREND_HIGH_INTEREST
        } else {
            TREND_EMERGING
        };

        let dominant_signal = match cfg.dominant_signal {
            DominantSignalPolicy::Fixed(signal_type) => signal_type,
            DominantSignalPolicy::Computed => largest_contributor(&contributions),
        };

        tracing::debug!(
            topic = %target,
            signals = signals.len(),
            score,
            weeks_active,
            sources = source_types.len(),
            status = ?status,
            "scored interest"
        );

        InterestResult {
            target: target.to_string(),
            score,
            trend: trend.to_string(),
            dominant_signal,
            status,
            breakdown: ScoreBreakdown {
                base_score,
                effort_bonus,
                time_multiplier,
                weeks_active,
                source_types: source_types.into_iter().collect(),
                signal_count: signals.len(),
            },
        }
    }

    /// Score `target` as of the current wall-clock time
    pub fn score_now(&self, target: &str, signals: &[Signal]) -> InterestResult {
        self.score(target, signals, Utc::now())
    }
}

/// Result for a target with no signals
fn empty_result(target: &str) -> InterestResult {
    InterestResult {
        target: target.to_string(),
        score: 0.0,
        trend: TREND_NEW.to_string(),
        dominant_signal: SignalType::Choice,
        status: InterestStatus::Neutral,
        breakdown: ScoreBreakdown::default(),
    }
}

/// Whole weeks from `from` to `to`, truncated toward zero
fn whole_weeks_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds() / WEEK_MS
}

/// Fractional signal age in weeks.
///
/// Signals stamped after `now` count as brand new, so the decay weight never
/// exceeds 1.0.
fn age_in_weeks(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_ms = (now - timestamp).num_milliseconds().max(0);
    age_ms as f64 / WEEK_MS as f64
}

/// Source types mentioned in a single context string
pub fn sources_in_context(context: &str) -> BTreeSet<SourceType> {
    let lowered = context.to_lowercase();
    SOURCE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, source)| *source)
        .collect()
}

/// Distinct source types across all signal contexts
fn detect_source_types(signals: &[Signal]) -> BTreeSet<SourceType> {
    signals
        .iter()
        .filter_map(|s| s.context.as_deref())
        .flat_map(sources_in_context)
        .collect()
}

/// Signal type with the largest contribution; ties go to the earlier type
fn largest_contributor(contributions: &[f64; 5]) -> SignalType {
    let mut best = SignalType::Choice;
    let mut best_value = contributions[best.index()];
    for signal_type in SignalType::ALL.iter().skip(1) {
        let value = contributions[signal_type.index()];
        if value > best_value {
            best = *signal_type;
            best_value = value;
        }
    }
    best
}
