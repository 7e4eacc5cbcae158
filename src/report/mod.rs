//! The incident report schema and its validation.
//!
//! A report is constructed exactly once, from exactly one completion
//! response, and never mutated afterwards; rendering is a pure read.

pub mod markdown;

use serde::{Deserialize, Serialize};

use crate::base::types::CopilotError;

/// A single event in the incident timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// When the event occurred: exact ("2024-01-08 14:45") or inferred
    /// relative time ("about 10 minutes later").
    pub timestamp: String,
    /// What happened.
    pub event_description: String,
    /// Advisory severity (e.g. "critical", "warning", "info"); not a
    /// closed enum.
    pub severity: Option<String>,
}

/// A follow-up task extracted from the incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    /// Informal scale, e.g. "high", "medium", "low".
    pub priority: String,
    pub assigned_to: Option<String>,
    pub estimated_completion: Option<String>,
}

/// A complete structured incident report.
///
/// Sequences keep the order the extraction produced; nothing here
/// re-sorts, deduplicates, or merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub incident_id: Option<String>,
    pub title: String,
    pub executive_summary: String,
    pub affected_systems: Vec<String>,
    /// Chronological by the model's best effort.
    pub timeline: Vec<TimelineEvent>,
    /// May state "unknown".
    pub root_cause_hypothesis: String,
    pub impact_assessment: String,
    pub resolution_summary: String,
    pub action_items: Vec<ActionItem>,
    pub related_incidents: Option<Vec<String>>,
}

impl IncidentReport {
    /// Validate raw completion text into a report.
    ///
    /// Two distinct failure classes, so callers can tell "not even
    /// structured" from "structured but invalid":
    /// 1. text that is not well-formed JSON fails with
    ///    [`CopilotError::MalformedResponse`];
    /// 2. well-formed JSON that misses or mistypes a required field
    ///    fails with [`CopilotError::SchemaViolation`].
    ///
    /// Unknown extra fields are ignored. No trimming, case-normalizing,
    /// or defaulting happens beyond serde's `Option` handling, and no
    /// heuristic text-scraping repair is attempted; re-running the whole
    /// pipeline is the caller's remedy for a bad completion.
    pub fn from_completion(text: &str) -> Result<Self, CopilotError> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| CopilotError::MalformedResponse(e.to_string()))?;

        serde_json::from_value(value).map_err(|e| CopilotError::SchemaViolation(e.to_string()))
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_document() -> serde_json::Value {
        json!({
            "incident_id": "INC-2024-001",
            "title": "DB Outage",
            "executive_summary": "Brief outage.",
            "affected_systems": ["db-primary", "api-gateway"],
            "timeline": [
                { "timestamp": "14:45", "event_description": "Errors begin", "severity": "critical" },
                { "timestamp": "15:10", "event_description": "DB restarted", "severity": null }
            ],
            "root_cause_hypothesis": "Connection pool exhaustion",
            "impact_assessment": "500 errors for 30 min",
            "resolution_summary": "Pool restarted",
            "action_items": [
                { "task": "Fix cron schedule", "priority": "high", "assigned_to": null, "estimated_completion": null }
            ],
            "related_incidents": null
        })
    }

    #[test]
    fn complete_document_validates_without_mutation() {
        let text = complete_document().to_string();
        let report = IncidentReport::from_completion(&text).unwrap();

        assert_eq!(report.incident_id.as_deref(), Some("INC-2024-001"));
        assert_eq!(report.title, "DB Outage");
        assert_eq!(report.affected_systems, vec!["db-primary", "api-gateway"]);
        assert_eq!(report.timeline.len(), 2);
        assert_eq!(report.timeline[0].severity.as_deref(), Some("critical"));
        assert_eq!(report.timeline[1].severity, None);
        assert_eq!(report.action_items[0].assigned_to, None);
        assert_eq!(report.related_incidents, None);

        // Round trip: the validator performed no coercion.
        assert_eq!(serde_json::to_value(&report).unwrap(), complete_document());
    }

    #[test]
    fn non_json_text_is_malformed() {
        let err = IncidentReport::from_completion("Sure! Here is your report:").unwrap_err();
        assert!(matches!(err, CopilotError::MalformedResponse(_)));
    }

    #[test]
    fn fenced_json_is_malformed_not_repaired() {
        let text = format!("```json\n{}\n```", complete_document());
        let err = IncidentReport::from_completion(&text).unwrap_err();
        assert!(matches!(err, CopilotError::MalformedResponse(_)));
    }

    #[test]
    fn missing_required_field_is_schema_violation() {
        let mut doc = complete_document();
        doc.as_object_mut().unwrap().remove("title");

        let err = IncidentReport::from_completion(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CopilotError::SchemaViolation(_)));
    }

    #[test]
    fn null_required_field_is_schema_violation() {
        let mut doc = complete_document();
        doc["root_cause_hypothesis"] = json!(null);

        let err = IncidentReport::from_completion(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CopilotError::SchemaViolation(_)));
    }

    #[test]
    fn wrong_list_element_type_is_schema_violation() {
        let mut doc = complete_document();
        doc["timeline"] = json!(["14:45 errors begin"]);

        let err = IncidentReport::from_completion(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CopilotError::SchemaViolation(_)));
    }

    #[test]
    fn json_scalar_is_schema_violation() {
        // A bare string is well-formed JSON, just not a report.
        let err = IncidentReport::from_completion("\"not a report\"").unwrap_err();
        assert!(matches!(err, CopilotError::SchemaViolation(_)));
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let mut doc = complete_document();
        doc["confidence"] = json!(0.95);
        doc["timeline"][0]["annotations"] = json!(["inferred"]);

        let report = IncidentReport::from_completion(&doc.to_string()).unwrap();
        assert_eq!(report.title, "DB Outage");
    }

    #[test]
    fn absent_optional_fields_default_to_none() {
        let mut doc = complete_document();
        let obj = doc.as_object_mut().unwrap();
        obj.remove("incident_id");
        obj.remove("related_incidents");

        let report = IncidentReport::from_completion(&doc.to_string()).unwrap();
        assert_eq!(report.incident_id, None);
        assert_eq!(report.related_incidents, None);
    }

    #[test]
    fn empty_sequences_are_valid() {
        let mut doc = complete_document();
        doc["affected_systems"] = json!([]);
        doc["timeline"] = json!([]);
        doc["action_items"] = json!([]);

        let report = IncidentReport::from_completion(&doc.to_string()).unwrap();
        assert!(report.affected_systems.is_empty());
        assert!(report.timeline.is_empty());
        assert!(report.action_items.is_empty());
    }
}
