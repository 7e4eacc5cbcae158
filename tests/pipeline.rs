#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use incident_copilot::{
    base::{
        config::{Config, ConfigInner},
        types::{CompletionRequest, CopilotError},
    },
    copilot::IncidentCopilot,
    service::llm::{GenericCompletionClient, LlmClient},
};
use mockall::mock;
use serde_json::json;

// Mocks.

// Mock completion client for testing the pipeline offline.

mock! {
    pub Completion {}

    #[async_trait]
    impl GenericCompletionClient for Completion {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CopilotError>;
    }
}

// Helpers.

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: "test_key".to_string(),
            model: "gpt-4o-2024-08-06".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
            output_dir: "output".to_string(),
            ..Default::default()
        }),
    }
}

fn copilot_with(mock: MockCompletion) -> IncidentCopilot {
    IncidentCopilot::with_client(&test_config(), LlmClient::new(Arc::new(mock)))
}

/// A complete, schema-conformant completion payload.
fn completion_json() -> String {
    json!({
        "incident_id": "INC-4821",
        "title": "Prod DB Outage",
        "executive_summary": "Connection pool exhaustion caused 500 errors for 30 minutes.",
        "affected_systems": ["prod-db", "api-gateway"],
        "timeline": [
            { "timestamp": "14:45", "event_description": "Users report 500 errors", "severity": "critical" },
            { "timestamp": "15:10", "event_description": "Database restarted", "severity": null }
        ],
        "root_cause_hypothesis": "Connection pool exhausted by a runaway cron job",
        "impact_assessment": "All API traffic returned errors for 30 minutes",
        "resolution_summary": "Restarted the database and staggered the cron schedule",
        "action_items": [
            { "task": "Stagger cron schedule", "priority": "high", "assigned_to": "dave", "estimated_completion": "2025-07-01" }
        ],
        "related_incidents": ["INC-4515"]
    })
    .to_string()
}

// Tests.

#[tokio::test]
async fn empty_input_fails_without_calling_the_endpoint() {
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(0);

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::EmptyInput));

    let err = copilot.parse_incident("   \n\t  ", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::EmptyInput));
}

#[tokio::test]
async fn blank_model_override_fails_without_calling_the_endpoint() {
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(0);

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", Some("   ")).await.unwrap_err();
    assert!(matches!(err, CopilotError::InvalidArgument(_)));
}

#[tokio::test]
async fn well_formed_completion_round_trips_to_markdown() {
    let mut mock = MockCompletion::new();
    mock.expect_complete()
        .withf(|request: &CompletionRequest| request.model == "gpt-4o-2024-08-06" && request.temperature == 0.3 && request.max_tokens == 4096)
        .times(1)
        .returning(|_| Ok(completion_json()));

    let copilot = copilot_with(mock);

    let report = copilot.parse_incident("prod db slow, users reporting 500 errors", None).await.unwrap();

    assert_eq!(report.title, "Prod DB Outage");
    assert_eq!(report.incident_id.as_deref(), Some("INC-4821"));
    assert_eq!(report.affected_systems, vec!["prod-db", "api-gateway"]);
    assert_eq!(report.timeline.len(), 2);
    assert_eq!(report.timeline[1].severity, None);

    let markdown = copilot.format_markdown(&report);

    assert!(markdown.starts_with("# Incident Report: Prod DB Outage\n\n"));
    assert!(markdown.contains("## Timeline\n**14:45** - Users report 500 errors [critical]\n**15:10** - Database restarted\n\n"));
    assert!(markdown.contains("## Action Items\n1. **[high]** Stagger cron schedule (Assigned: dave)\n"));
    assert!(markdown.ends_with("\n## Related Incidents\n- INC-4515"));

    // Rendering is a pure read; the same report yields the same bytes.
    assert_eq!(markdown, copilot.format_markdown(&report));
}

#[tokio::test]
async fn prompts_carry_the_contract_and_raw_text() {
    let mut mock = MockCompletion::new();
    mock.expect_complete()
        .withf(|request: &CompletionRequest| {
            request.system.contains("executive_summary")
                && request.system.contains("root_cause_hypothesis")
                && request.user.contains("unique marker text 123")
        })
        .times(1)
        .returning(|_| Ok(completion_json()));

    let copilot = copilot_with(mock);

    copilot.parse_incident("unique marker text 123", None).await.unwrap();
}

#[tokio::test]
async fn configured_system_prompt_overrides_the_default() {
    let config = Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: "test_key".to_string(),
            model: "gpt-4o-2024-08-06".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
            system_prompt: Some("Custom extraction contract.".to_string()),
            ..Default::default()
        }),
    };

    let mut mock = MockCompletion::new();
    mock.expect_complete()
        .withf(|request: &CompletionRequest| request.system == "Custom extraction contract.")
        .times(1)
        .returning(|_| Ok(completion_json()));

    let copilot = IncidentCopilot::with_client(&config, LlmClient::new(Arc::new(mock)));

    copilot.parse_incident("db down", None).await.unwrap();
}

#[tokio::test]
async fn model_override_reaches_the_request() {
    let mut mock = MockCompletion::new();
    mock.expect_complete()
        .withf(|request: &CompletionRequest| request.model == "gpt-4.1-mini")
        .times(1)
        .returning(|_| Ok(completion_json()));

    let copilot = copilot_with(mock);

    copilot.parse_incident("db down", Some("gpt-4.1-mini")).await.unwrap();
}

#[tokio::test]
async fn malformed_completion_is_classified_without_retry() {
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(1).returning(|_| Ok("Sure! Here is your report: {\"title\":".to_string()));

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::MalformedResponse(_)));
}

#[tokio::test]
async fn incomplete_document_is_a_schema_violation() {
    let mut mock = MockCompletion::new();
    // Well-formed JSON, but missing almost every required field.
    mock.expect_complete().times(1).returning(|_| Ok(json!({ "title": "Outage" }).to_string()));

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::SchemaViolation(_)));
}

#[tokio::test]
async fn scalar_json_is_a_schema_violation() {
    let mut mock = MockCompletion::new();
    // "42" parses as JSON, but it is not a report object.
    mock.expect_complete().times(1).returning(|_| Ok("42".to_string()));

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::SchemaViolation(_)));
}

#[tokio::test]
async fn connection_failures_propagate_with_a_single_call() {
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(1).returning(|_| Err(CopilotError::Connection("dns lookup failed".to_string())));

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::Connection(_)));
}

#[tokio::test]
async fn rate_limits_propagate_with_a_single_call() {
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(1).returning(|_| Err(CopilotError::RateLimited("try again later".to_string())));

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::RateLimited(_)));
}

#[tokio::test]
async fn endpoint_errors_propagate_with_a_single_call() {
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(1).returning(|_| Err(CopilotError::Endpoint("internal server error".to_string())));

    let copilot = copilot_with(mock);

    let err = copilot.parse_incident("db down", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::Endpoint(_)));
}

#[tokio::test]
async fn every_error_carries_actionable_advice() {
    let errors = [
        CopilotError::EmptyInput,
        CopilotError::Connection("x".to_string()),
        CopilotError::RateLimited("x".to_string()),
        CopilotError::Endpoint("x".to_string()),
        CopilotError::MalformedResponse("x".to_string()),
        CopilotError::SchemaViolation("x".to_string()),
        CopilotError::InvalidArgument("x".to_string()),
    ];

    for err in errors {
        assert!(!err.advice().is_empty(), "no advice for {err}");
    }
}
