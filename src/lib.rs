//! Sprout Insight - On-device interest scoring and archetype classification
//!
//! Insight turns a child's logged behavioral signals into per-topic interest
//! scores, and a batch of task attempts into a coarse psychological archetype,
//! through a deterministic pipeline: input adaptation → validation → scoring
//! or classification → report encoding.
//!
//! ## Modules
//!
//! - **Interest Scorer**: Time-decayed, multi-signal interest score per target
//! - **Archetype Classifier**: Rule-based profile from activity metrics
//! - **Insight Processor**: Stateful signal log scored across every target

pub mod adapter;
pub mod archetype;
pub mod config;
pub mod encoder;
pub mod error;
pub mod interest;
pub mod pipeline;
pub mod signal_log;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::InputAdapter;
pub use archetype::ArchetypeClassifier;
pub use config::{ClassifierConfig, DominantSignalPolicy, EngineConfig, ScoringConfig};
pub use encoder::{InsightEncoder, REPORT_SCHEMA_VERSION};
pub use error::{ComputeError, ValidationError};
pub use interest::InterestScorer;
pub use pipeline::{metrics_to_profile_json, signals_to_interest_json, InsightProcessor};
pub use signal_log::{InMemorySignalLog, SignalStore};
pub use types::{
    ActivityMetric, Archetype, InterestResult, InterestStatus, PsychologicalProfile, Signal,
    SignalType,
};

/// Insight version embedded in all report payloads
pub const INSIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "sprout-insight";
