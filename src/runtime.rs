//! Runtime services and shared state for the realtime bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    copilot::IncidentCopilot,
    service::chat::ChatClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the incident pipeline, and the chat
/// client. It is designed to be trivially cloneable, allowing it to be passed
/// around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The incident pipeline.
    pub copilot: IncidentCopilot,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the pipeline.
        let copilot = IncidentCopilot::new(&config);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, copilot.clone()).await?;

        Ok(Self { config, copilot, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
