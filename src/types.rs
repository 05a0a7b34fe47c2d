//! Core data types
//!
//! Signals and activity metrics flow into the engine; interest results and
//! psychological profiles flow out. All types serialize with serde so they can
//! cross the FFI/CLI boundary as JSON.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trend label for a target with no signals yet
pub const TREND_NEW: &str = "New";

/// Trend label for a score above the high-interest threshold
pub const TREND_HIGH_INTEREST: &str = "High Interest";

/// Trend label for everything else
pub const TREND_EMERGING: &str = "Emerging";

// ============================================================================
// Signals
// ============================================================================

/// Kind of behavioral observation carried by a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// The child picked this target (value is a count)
    Choice,
    /// Time spent on the target (value in seconds)
    Time,
    /// Self- or parent-rated effort (0-10)
    Effort,
    /// Emotional intensity while engaged (0-1)
    Emotion,
    /// Temperament observation; carries no score weight yet
    Temperament,
}

impl SignalType {
    /// All signal types in declaration order
    pub const ALL: [SignalType; 5] = [
        SignalType::Choice,
        SignalType::Time,
        SignalType::Effort,
        SignalType::Emotion,
        SignalType::Temperament,
    ];

    /// Position of this type within [`SignalType::ALL`]
    pub fn index(self) -> usize {
        match self {
            SignalType::Choice => 0,
            SignalType::Time => 1,
            SignalType::Effort => 2,
            SignalType::Emotion => 3,
            SignalType::Temperament => 4,
        }
    }
}

/// Where a signal came from, inferred from its free-text context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    MicroTask,
    LifeTask,
    Simulation,
    Question,
}

/// One logged behavioral observation.
///
/// Signals are append-only: once logged they are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal identifier (UUID v4), for provenance only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_id: Option<String>,
    /// Signal type
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// Skill or topic label (e.g. "MATH")
    pub target: String,
    /// Magnitude; meaning depends on `signal_type`
    pub value: f64,
    /// Free-text annotation, keyword-matched to detect the signal source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Creation time (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// Create a new signal with a fresh identifier
    pub fn new(
        signal_type: SignalType,
        target: impl Into<String>,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            signal_id: Some(uuid::Uuid::new_v4().to_string()),
            signal_type,
            target: target.into(),
            value,
            context: None,
            timestamp,
        }
    }

    /// Attach a context annotation
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Check the preconditions the scorer relies on
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.value.is_finite() {
            return Err(ValidationError::NonFiniteValue);
        }
        if self.value < 0.0 {
            return Err(ValidationError::NegativeValue(self.value));
        }
        if self.target.trim().is_empty() {
            return Err(ValidationError::EmptyTarget);
        }
        Ok(())
    }
}

// ============================================================================
// Activity metrics
// ============================================================================

/// How deeply the child engaged with a task, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementDepth {
    Avoidant,
    Low,
    Medium,
    High,
}

/// Emotional feedback recorded after a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalFeedback {
    Happy,
    Neutral,
    Frustrated,
    Stressed,
    Bored,
}

/// One observed task attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetric {
    /// Task label
    pub task_type: String,
    /// Whether the task was finished
    pub is_completed: bool,
    /// Engagement depth
    pub engagement_depth: EngagementDepth,
    /// Emotional feedback
    pub emotional_feedback: EmotionalFeedback,
}

impl ActivityMetric {
    pub fn new(
        task_type: impl Into<String>,
        is_completed: bool,
        engagement_depth: EngagementDepth,
        emotional_feedback: EmotionalFeedback,
    ) -> Self {
        Self {
            task_type: task_type.into(),
            is_completed,
            engagement_depth,
            emotional_feedback,
        }
    }
}

// ============================================================================
// Interest output
// ============================================================================

/// Interest classification for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestStatus {
    Neutral,
    Emerging,
    Confirmed,
}

/// Intermediate totals behind an interest score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Decayed contribution of choice, time and emotion signals
    pub base_score: f64,
    /// Decayed contribution of effort signals
    pub effort_bonus: f64,
    /// Multiplier from long time-on-task signals (starts at 1.0)
    pub time_multiplier: f64,
    /// Whole weeks since the first signal
    pub weeks_active: i64,
    /// Distinct sources detected in signal contexts, sorted
    pub source_types: Vec<SourceType>,
    /// Number of signals scored
    pub signal_count: usize,
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self {
            base_score: 0.0,
            effort_bonus: 0.0,
            time_multiplier: 1.0,
            weeks_active: 0,
            source_types: Vec::new(),
            signal_count: 0,
        }
    }
}

/// Interest score for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestResult {
    /// Target label
    pub target: String,
    /// Weighted, time-decayed score (>= 0)
    pub score: f64,
    /// Trend label
    pub trend: String,
    /// Signal type reported as dominant
    pub dominant_signal: SignalType,
    /// Classification
    pub status: InterestStatus,
    /// Intermediate totals
    pub breakdown: ScoreBreakdown,
}

// ============================================================================
// Profile output
// ============================================================================

/// Coarse behavioral archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Undefined,
    Negotiator,
    Builder,
    Observer,
    Explorer,
    /// Reserved; not assigned by the classifier
    Performer,
}

/// Frequency statistics behind an archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetrics {
    /// Share of tasks with avoidant engagement (0-1)
    pub task_avoidance_freq: f64,
    /// Placeholder until task timing is wired (0-1)
    pub completion_speed: f64,
    /// Task types the child enjoyed or engaged deeply with, sorted
    pub preference_clusters: Vec<String>,
    /// Placeholder until redemption history is wired (0-1)
    pub reward_sensitivity: f64,
    /// Number of stressed outcomes
    pub frustration_signals: u32,
    /// Share of completed tasks (0-1)
    pub completion_rate: f64,
    /// Number of metrics analyzed
    pub sample_size: usize,
}

impl ProfileMetrics {
    /// Metrics for an empty input
    pub fn empty() -> Self {
        Self {
            task_avoidance_freq: 0.0,
            completion_speed: 0.0,
            preference_clusters: Vec::new(),
            reward_sensitivity: 0.0,
            frustration_signals: 0,
            completion_rate: 0.0,
            sample_size: 0,
        }
    }
}

/// Archetype plus the metrics it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsychologicalProfile {
    pub archetype: Archetype,
    pub metrics: ProfileMetrics,
}

// ============================================================================
// Report payload
// ============================================================================

/// Producer metadata embedded in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// Versioned report wrapping interest results and an optional profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPayload {
    /// Report schema version
    pub schema_version: String,
    /// Producer metadata
    pub producer: InsightProducer,
    /// When this report was computed (RFC3339)
    pub computed_at_utc: String,
    /// Interest results, one per target
    #[serde(default)]
    pub interests: Vec<InterestResult>,
    /// Archetype profile, when metrics were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<PsychologicalProfile>,
}
