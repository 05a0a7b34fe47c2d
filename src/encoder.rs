//! Report encoder
//!
//! Wraps interest results and profiles in a versioned JSON payload carrying
//! producer metadata.

use crate::error::ComputeError;
use crate::types::{InsightPayload, InsightProducer, InterestResult, PsychologicalProfile};
use crate::{INSIGHT_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "insight.report.v1";

/// Report encoder
#[derive(Debug, Clone)]
pub struct InsightEncoder {
    instance_id: String,
}

impl Default for InsightEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build a report payload
    pub fn encode(
        &self,
        interests: Vec<InterestResult>,
        profile: Option<PsychologicalProfile>,
    ) -> InsightPayload {
        InsightPayload {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            producer: InsightProducer {
                name: PRODUCER_NAME.to_string(),
                version: INSIGHT_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            interests,
            profile,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        interests: Vec<InterestResult>,
        profile: Option<PsychologicalProfile>,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(interests, profile);
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Archetype, InterestStatus, ProfileMetrics, ScoreBreakdown, SignalType,
    };

    fn make_interest() -> InterestResult {
        InterestResult {
            target: "MATH".to_string(),
            score: 29.0,
            trend: "Emerging".to_string(),
            dominant_signal: SignalType::Time,
            status: InterestStatus::Emerging,
            breakdown: ScoreBreakdown::default(),
        }
    }

    #[test]
    fn test_encode_payload() {
        let encoder = InsightEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(vec![make_interest()], None);

        assert_eq!(payload.schema_version, REPORT_SCHEMA_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, INSIGHT_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.interests.len(), 1);
        assert!(payload.profile.is_none());
    }

    #[test]
    fn test_encode_to_json() {
        let profile = PsychologicalProfile {
            archetype: Archetype::Builder,
            metrics: ProfileMetrics::empty(),
        };
        let json = InsightEncoder::new()
            .encode_to_json(vec![make_interest()], Some(profile))
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["schema_version"], "insight.report.v1");
        assert_eq!(parsed["producer"]["name"], "sprout-insight");
        assert_eq!(parsed["interests"][0]["target"], "MATH");
        assert_eq!(parsed["interests"][0]["status"], "emerging");
        assert_eq!(parsed["interests"][0]["dominant_signal"], "time");
        assert_eq!(parsed["profile"]["archetype"], "builder");
    }

    #[test]
    fn test_profile_omitted_when_absent() {
        let json = InsightEncoder::new().encode_to_json(vec![], None).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("profile").is_none());
    }

    #[test]
    fn test_unique_instance_ids() {
        let payload1 = InsightEncoder::new().encode(vec![], None);
        let payload2 = InsightEncoder::new().encode(vec![], None);
        assert_ne!(payload1.producer.instance_id, payload2.producer.instance_id);
    }
}
