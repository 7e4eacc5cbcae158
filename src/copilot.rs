//! The incident pipeline: prompt → completion → validation → rendering.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        prompts,
        types::{CompletionRequest, CopilotError},
    },
    report::{IncidentReport, markdown},
    service::llm::LlmClient,
};

/// The orchestrator every front end calls into.
///
/// Stateless between calls apart from the configured model, sampling
/// knobs, and the completion client handle; clones share those, so
/// concurrent `parse_incident` calls need no locking.
#[derive(Clone)]
pub struct IncidentCopilot {
    config: Config,
    llm: LlmClient,
}

impl IncidentCopilot {
    /// Create a copilot talking to OpenAI.
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, LlmClient::openai(config))
    }

    /// Create a copilot with an explicit completion client. Tests use
    /// this to substitute a stub endpoint.
    pub fn with_client(config: &Config, llm: LlmClient) -> Self {
        Self { config: config.clone(), llm }
    }

    /// Transform messy incident notes into a structured report.
    ///
    /// Exactly one endpoint call per invocation, no internal retry; the
    /// first failing stage's classification is returned unchanged, and
    /// a failed invocation never returns a partial report.
    #[instrument(name = "IncidentCopilot::parse_incident", skip_all)]
    pub async fn parse_incident(&self, raw_text: &str, model: Option<&str>) -> Result<IncidentReport, CopilotError> {
        // Fast-fail guards, before any endpoint call is made.
        if raw_text.trim().is_empty() {
            return Err(CopilotError::EmptyInput);
        }

        let model = match model {
            Some(m) if m.trim().is_empty() => return Err(CopilotError::InvalidArgument("model override is blank".to_string())),
            Some(m) => m,
            None => self.config.model.as_str(),
        };

        info!("Parsing incident with model {} ({} chars of input)", model, raw_text.len());

        let request = CompletionRequest {
            system: prompts::get_system_prompt(&self.config).to_string(),
            user: prompts::build_user_prompt(raw_text),
            model: model.to_string(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let completion = self.llm.complete(&request).await?;
        let report = IncidentReport::from_completion(&completion)?;

        info!("Parsed incident: {}", report.title);

        Ok(report)
    }

    /// Render a validated report as markdown.
    ///
    /// A pure read: a given report always renders to the same bytes.
    pub fn format_markdown(&self, report: &IncidentReport) -> String {
        markdown::render(report)
    }
}
