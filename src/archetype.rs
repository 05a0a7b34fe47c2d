//! Archetype inference
//!
//! Maps frequency statistics over activity metrics to a coarse behavioral
//! archetype. Rules are checked in priority order and the first match wins,
//! since the categories overlap.

use crate::config::ClassifierConfig;
use crate::error::ComputeError;
use crate::types::{
    ActivityMetric, Archetype, EmotionalFeedback, EngagementDepth, ProfileMetrics,
    PsychologicalProfile,
};
use std::collections::BTreeSet;

/// Classifier for behavioral archetypes
#[derive(Debug, Clone, Default)]
pub struct ArchetypeClassifier {
    config: ClassifierConfig,
}

impl ArchetypeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom thresholds, rejecting invalid ones
    pub fn with_config(config: ClassifierConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Thresholds this classifier was built with
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Analyze a child's activity metrics
    pub fn analyze(&self, metrics: &[ActivityMetric]) -> PsychologicalProfile {
        if metrics.is_empty() {
            return PsychologicalProfile {
                archetype: Archetype::Undefined,
                metrics: ProfileMetrics::empty(),
            };
        }

        let total = metrics.len() as f64;
        let avoidance_count = metrics
            .iter()
            .filter(|m| m.engagement_depth == EngagementDepth::Avoidant)
            .count();
        let completion_count = metrics.iter().filter(|m| m.is_completed).count();
        let frustration_count = metrics
            .iter()
            .filter(|m| m.emotional_feedback == EmotionalFeedback::Stressed)
            .count() as u32;

        let task_avoidance_freq = avoidance_count as f64 / total;
        let completion_rate = completion_count as f64 / total;

        let archetype = self.classify(task_avoidance_freq, completion_rate, frustration_count);

        tracing::debug!(
            sample_size = metrics.len(),
            task_avoidance_freq,
            completion_rate,
            frustration_count,
            archetype = ?archetype,
            "analyzed activity metrics"
        );

        PsychologicalProfile {
            archetype,
            metrics: ProfileMetrics {
                task_avoidance_freq,
                completion_speed: self.config.completion_speed_placeholder,
                preference_clusters: preference_clusters(metrics),
                reward_sensitivity: self.config.reward_sensitivity_placeholder,
                frustration_signals: frustration_count,
                completion_rate,
                sample_size: metrics.len(),
            },
        }
    }

    /// Priority-ordered archetype rules.
    ///
    /// `Performer` is never produced here.
    fn classify(
        &self,
        task_avoidance_freq: f64,
        completion_rate: f64,
        frustration_count: u32,
    ) -> Archetype {
        let cfg = &self.config;
        if task_avoidance_freq > cfg.negotiator_avoidance_above {
            Archetype::Negotiator
        } else if completion_rate > cfg.builder_completion_above {
            Archetype::Builder
        } else if completion_rate < cfg.observer_completion_below && frustration_count == 0 {
            Archetype::Observer
        } else {
            Archetype::Explorer
        }
    }
}

/// Distinct task types the child enjoyed or engaged deeply with, sorted
fn preference_clusters(metrics: &[ActivityMetric]) -> Vec<String> {
    metrics
        .iter()
        .filter(|m| {
            m.emotional_feedback == EmotionalFeedback::Happy
                || m.engagement_depth == EngagementDepth::High
        })
        .map(|m| m.task_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
