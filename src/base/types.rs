use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Classified failures of the incident pipeline.
///
/// Each variant corresponds to one remediation path: caller fixes the
/// input, caller retries later, or caller re-runs the whole pipeline.
/// The pipeline itself never retries and never substitutes a default
/// report; every failure is surfaced as exactly one of these.
#[derive(Debug, Error)]
pub enum CopilotError {
    /// The raw input was empty or whitespace-only. Checked before any
    /// endpoint call is made.
    #[error("input is empty")]
    EmptyInput,

    /// Transport-level failure reaching the completion endpoint.
    #[error("unable to reach the completion endpoint: {0}")]
    Connection(String),

    /// The endpoint signalled throttling. Retry later with backoff;
    /// the pipeline does not retry on its own.
    #[error("completion endpoint rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other endpoint-reported failure (invalid request, server
    /// error, content policy refusal, empty response).
    #[error("completion endpoint error: {0}")]
    Endpoint(String),

    /// The completion text was not well-formed JSON at all.
    #[error("completion output is not well-formed JSON: {0}")]
    MalformedResponse(String),

    /// The completion text parsed as JSON but failed the report schema
    /// (missing or mistyped required field, wrong list element type).
    #[error("completion output does not satisfy the report schema: {0}")]
    SchemaViolation(String),

    /// A caller-supplied argument was invalid (e.g. a blank model
    /// override). A programming error at the call site, not a model or
    /// endpoint problem.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CopilotError {
    /// Actionable remediation text for user-facing surfaces.
    ///
    /// All front ends (CLI, web, Slack) share this mapping so "check
    /// your network" and "the model's output was unusable" stay
    /// distinguishable everywhere.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Provide incident notes, logs, or chat transcripts to analyze.",
            Self::Connection(_) => "Check your network connection and try again.",
            Self::RateLimited(_) => "Wait a moment and try again.",
            Self::Endpoint(_) => "The completion endpoint rejected the request; check your API key and model name.",
            Self::MalformedResponse(_) => "The model's output wasn't structured; running the analysis again usually helps.",
            Self::SchemaViolation(_) => "The model's output was structured but incomplete; running the analysis again usually helps.",
            Self::InvalidArgument(_) => "Check the arguments passed to the pipeline.",
        }
    }
}

/// One fully-specified request to the completion endpoint: everything a
/// provider needs to produce the single top response.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fixed instruction describing the extraction task and output contract.
    pub system: String,
    /// Lead-in sentence plus the raw incident text, verbatim.
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}
