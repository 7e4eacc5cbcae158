use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::{CopilotError, Void},
    copilot::IncidentCopilot,
    service::chat::ChatClient,
};

/// Spawn a channel digest without blocking the event listener.
#[instrument(skip_all)]
pub fn handle_incident_request(channel_id: String, thread_ts: Option<String>, copilot: IncidentCopilot, chat: ChatClient, message_limit: u16) {
    tokio::spawn(async move {
        // Process the request.
        let result = handle_incident_request_internal(&channel_id, thread_ts.as_deref(), &copilot, &chat, message_limit).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling incident request: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_incident_request_internal(channel_id: &str, thread_ts: Option<&str>, copilot: &IncidentCopilot, chat: &ChatClient, message_limit: u16) -> Void {
    // Pull the recent channel history and combine it, newest first, exactly
    // as the platform returns it.

    let messages = chat.fetch_messages(channel_id, message_limit).await?;
    let raw_text = messages.join("\n");

    info!("Combined {} messages for analysis.", messages.len());

    // Run the pipeline; a failure becomes a readable channel reply instead
    // of a silent drop.

    match run_pipeline(&raw_text, copilot).await {
        Ok(markdown) => {
            let reply = format!("📊 **Incident Report Generated**\n\n```\n{markdown}\n```");

            chat.post_message(channel_id, &reply, thread_ts).await?;

            info!("Posted incident report to channel {}.", channel_id);
        }
        Err(err) => {
            let reply = format!("❌ Error generating report: {err}. {}", err.advice());

            chat.post_message(channel_id, &reply, thread_ts).await?;
        }
    }

    Ok(())
}

async fn run_pipeline(raw_text: &str, copilot: &IncidentCopilot) -> Result<String, CopilotError> {
    let report = copilot.parse_incident(raw_text, None).await?;

    Ok(copilot.format_markdown(&report))
}
