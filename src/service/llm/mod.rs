pub mod openai;

use crate::base::types::{CompletionRequest, CopilotError};
use async_trait::async_trait;
use std::sync::Arc;
use std::ops::Deref;

// Traits.

/// Generic completion client trait that providers must implement.
///
/// One call sends a fully-built prompt to a completion endpoint and
/// returns the raw text of the single top response. Implementations
/// classify their provider's failures into [`CopilotError`]; they do
/// not retry, fall back to another model, or switch providers on their
/// own — provider choice is configuration, not a code path.
#[async_trait]
pub trait GenericCompletionClient: Send + Sync + 'static {
    /// Execute one completion request and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CopilotError>;
}

// Structs.

/// Completion client handle for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericCompletionClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericCompletionClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericCompletionClient>) -> Self {
        Self { inner }
    }
}
