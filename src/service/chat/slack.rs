//! Slack implementation of the chat service.
//!
//! Covers both Slack surfaces:
//! - one-shot history fetch and report post (the manual digest and the web
//!   front end);
//! - the socket-mode realtime bot, which watches a workspace for the
//!   `/incident` slash command, trigger keywords in messages, and incident
//!   reactions, and answers with a generated report in-thread.

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    copilot::IncidentCopilot,
    interaction,
};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Statics.

/// Message substrings that make the realtime bot generate a report.
const TRIGGER_KEYWORDS: [&str; 3] = ["@incident-report", "/incident", "!incident"];

/// Reactions that make the realtime bot generate a report.
const TRIGGER_REACTIONS: [&str; 3] = ["rotating_light", "fire", "incident"];

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, copilot: IncidentCopilot) -> Res<Self> {
        let client = SlackChatClient::new(config, copilot).await?;
        Ok(Self::new(Arc::new(client)))
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self::new(Arc::new(client))
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    copilot: IncidentCopilot,
    chat: ChatClient,
    bot_user_id: String,
    message_limit: u16,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: Option<SlackApiToken>,
    bot_token: SlackApiToken,
    bot_user_id: String,
    client: Arc<FullClient>,
    copilot: IncidentCopilot,
    message_limit: u16,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, copilot: IncidentCopilot) -> Res<Self> {
        // Initialize tokens. The bot token is mandatory for every Slack
        // surface; the app token only matters once `start` is called.

        let bot_token_value = config
            .slack_bot_token
            .clone()
            .ok_or_else(|| anyhow::anyhow!("`slack_bot_token` is required for the Slack surfaces."))?;

        let bot_token = SlackApiToken::new(SlackApiTokenValue(bot_token_value));
        let app_token = config.slack_app_token.clone().map(|t| SlackApiToken::new(SlackApiTokenValue(t)));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            copilot,
            message_limit: config.slack_message_limit,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self))]
    async fn fetch_messages(&self, channel_id: &str, limit: u16) -> Res<Vec<String>> {
        let request = SlackApiConversationsHistoryRequest::new().with_channel(SlackChannelId(channel_id.to_string())).with_limit(limit);

        let session = self.client.open_session(&self.bot_token);

        let response = session
            .conversations_history(&request)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch channel history: {}", e))?;

        // Slack returns newest first; the order is passed through untouched.
        let messages = response.messages.iter().filter_map(|m| m.content.text.clone()).collect::<Vec<_>>();

        info!("Fetched {} messages from channel {}.", messages.len(), channel_id);

        Ok(messages)
    }

    #[instrument(skip(self, text))]
    async fn post_message(&self, channel_id: &str, text: &str, thread_ts: Option<&str>) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_link_names(true);

        if let Some(ts) = thread_ts {
            request = request.with_thread_ts(SlackTs(ts.to_string()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to post message: {}", e))?;

        Ok(())
    }

    async fn start(&self) -> Void {
        let Some(app_token) = &self.app_token else {
            return Err(anyhow::anyhow!("`slack_app_token` is required for the realtime bot."));
        };

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_command_events(handle_command_event).with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            copilot: self.copilot.clone(),
            chat: ChatClient::from(self.clone()),
            bot_user_id: self.bot_user_id.clone(),
            message_limit: self.message_limit,
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register the app token, then serve WS connections until shutdown.
        socket_mode_listener.listen_for(app_token).await?;

        socket_mode_listener.serve().await;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles the `/incident` slash command.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    if event.command.0 != "/incident" {
        warn!("Received unsupported command `{}`.", event.command.0);
        return Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text(format!("Unsupported command: {}", event.command.0))));
    }

    info!("Slash command trigger in channel {}.", event.channel_id.0);

    interaction::incident_request::handle_incident_request(
        event.channel_id.0.clone(),
        None,
        user_state.copilot.clone(),
        user_state.chat.clone(),
        user_state.message_limit,
    );

    // Ack immediately; the report lands as a channel message once ready.
    Ok(SlackCommandEventResponse::new(
        SlackMessageContent::new().with_text("📊 Generating an incident report from recent channel history ...".into()),
    ))
}

/// Handles push events from Slack (trigger keywords and reactions).
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(message_event) => {
            let channel_id = message_event.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned();

            // Edits, joins, and bot posts carry a subtype; a generated
            // report must never retrigger the bot.
            if message_event.subtype.is_some() {
                return Ok(());
            }

            if message_event.sender.user.as_ref().is_some_and(|u| u.0 == user_state.bot_user_id) {
                return Ok(());
            }

            let text = message_event.content.as_ref().and_then(|c| c.text.as_deref()).unwrap_or_default();

            if !is_trigger_text(text) {
                return Ok(());
            }

            info!("Trigger keyword detected in channel {}.", channel_id);

            // Reply in the existing thread, or start one on the triggering message.
            let thread_ts = message_event.origin.thread_ts.clone().unwrap_or(message_event.origin.ts.clone()).0;

            interaction::incident_request::handle_incident_request(
                channel_id,
                Some(thread_ts),
                user_state.copilot.clone(),
                user_state.chat.clone(),
                user_state.message_limit,
            );
        }
        SlackEventCallbackBody::ReactionAdded(reaction_event) => {
            if !TRIGGER_REACTIONS.contains(&reaction_event.reaction.0.as_str()) {
                return Ok(());
            }

            let SlackReactionsItem::Message(message) = &reaction_event.item else {
                return Ok(());
            };

            let channel_id = message.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned();
            let message_ts = message.origin.ts.0.to_owned();

            info!("Trigger reaction `{}` detected in channel {}.", reaction_event.reaction.0, channel_id);

            interaction::incident_request::handle_incident_request(
                channel_id,
                Some(message_ts),
                user_state.copilot.clone(),
                user_state.chat.clone(),
                user_state.message_limit,
            );
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}

/// True when a message contains any trigger keyword, case-insensitively.
fn is_trigger_text(text: &str) -> bool {
    let lowered = text.to_lowercase();

    TRIGGER_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_trigger_anywhere_in_the_message() {
        assert!(is_trigger_text("hey @incident-report please summarize"));
        assert!(is_trigger_text("/incident"));
        assert!(is_trigger_text("can someone run !incident here?"));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(is_trigger_text("!INCIDENT"));
        assert!(is_trigger_text("@Incident-Report"));
    }

    #[test]
    fn ordinary_messages_do_not_trigger() {
        assert!(!is_trigger_text("the incident was resolved at 15:00"));
        assert!(!is_trigger_text(""));
    }

    #[test]
    fn only_designated_reactions_trigger() {
        assert!(TRIGGER_REACTIONS.contains(&"rotating_light"));
        assert!(TRIGGER_REACTIONS.contains(&"fire"));
        assert!(TRIGGER_REACTIONS.contains(&"incident"));
        assert!(!TRIGGER_REACTIONS.contains(&"thumbsup"));
    }
}
