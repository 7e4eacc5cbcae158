//! OpenAI-backed implementation of the completion client.
//!
//! A thin wrapper around the chat completions API: system instruction +
//! user instruction in, raw text of the single top response out. The
//! request carries a schema-constrained response format as an
//! optimization; conformance is still validated locally afterwards,
//! since provider guarantees about schema adherence are not universal.

use std::sync::{Arc, OnceLock};

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{CompletionRequest, CopilotError},
};

use super::{GenericCompletionClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiCompletionClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI completion client implementation.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompletionClient {
    /// Create a new OpenAI completion client.
    #[instrument(name = "OpenAiCompletionClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self { client: Client::with_config(cfg) }
    }
}

#[async_trait]
impl GenericCompletionClient for OpenAiCompletionClient {
    #[instrument(name = "OpenAiCompletionClient::complete", skip_all)]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CopilotError> {
        let chat_request = build_chat_request(request).map_err(classify_openai_error)?;

        // Single shot: retries, backoff, and timeouts belong to the caller.
        let response = self.client.chat().create(chat_request).await.map_err(classify_openai_error)?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CopilotError::Endpoint("completion response contained no text".to_string()))?;

        info!("Completion returned {} characters", text.len());

        Ok(text)
    }
}

/// Build the chat request: system + user message, sampling knobs, and
/// the schema-constrained response format.
fn build_chat_request(request: &CompletionRequest) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let system = ChatCompletionRequestSystemMessageArgs::default().content(request.system.as_str()).build()?;
    let user = ChatCompletionRequestUserMessageArgs::default().content(request.user.as_str()).build()?;

    CreateChatCompletionRequestArgs::default()
        .model(&request.model)
        .temperature(request.temperature)
        .max_completion_tokens(request.max_tokens)
        .response_format(report_response_format().clone())
        .messages([system.into(), user.into()])
        .build()
}

/// Map provider failures onto the pipeline's error classes.
fn classify_openai_error(err: OpenAIError) -> CopilotError {
    match err {
        OpenAIError::Reqwest(e) => CopilotError::Connection(e.to_string()),
        OpenAIError::ApiError(api) => classify_api_error(api),
        other => CopilotError::Endpoint(other.to_string()),
    }
}

fn classify_api_error(api: ApiError) -> CopilotError {
    let throttled = api.code.as_deref() == Some("rate_limit_exceeded") || api.r#type.as_deref().is_some_and(|t| t.contains("rate_limit"));

    if throttled {
        CopilotError::RateLimited(api.message)
    } else {
        CopilotError::Endpoint(api.message)
    }
}

// Statics.

static REPORT_RESPONSE_FORMAT: OnceLock<ResponseFormat> = OnceLock::new();

/// Get the schema-constrained response format for the extraction call.
fn report_response_format() -> &'static ResponseFormat {
    REPORT_RESPONSE_FORMAT.get_or_init(|| ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: "incident_report".to_string(),
            description: Some("Structured incident report extracted from raw notes.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "incident_id": { "type": ["string", "null"] },
                    "title": { "type": "string" },
                    "executive_summary": { "type": "string" },
                    "affected_systems": { "type": "array", "items": { "type": "string" } },
                    "timeline": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "timestamp": { "type": "string" },
                                "event_description": { "type": "string" },
                                "severity": { "type": ["string", "null"] }
                            },
                            "required": ["timestamp", "event_description", "severity"],
                            "additionalProperties": false
                        }
                    },
                    "root_cause_hypothesis": { "type": "string" },
                    "impact_assessment": { "type": "string" },
                    "resolution_summary": { "type": "string" },
                    "action_items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "task": { "type": "string" },
                                "priority": { "type": "string" },
                                "assigned_to": { "type": ["string", "null"] },
                                "estimated_completion": { "type": ["string", "null"] }
                            },
                            "required": ["task", "priority", "assigned_to", "estimated_completion"],
                            "additionalProperties": false
                        }
                    },
                    "related_incidents": { "type": ["array", "null"], "items": { "type": "string" } }
                },
                "required": [
                    "incident_id", "title", "executive_summary", "affected_systems", "timeline",
                    "root_cause_hypothesis", "impact_assessment", "resolution_summary", "action_items", "related_incidents"
                ],
                "additionalProperties": false
            })),
            strict: Some(true),
        },
    })
}

// Tests.
