//! Web front end: a small form-driven UI over the incident pipeline.
//!
//! Three pages mirror the CLI workflow:
//! - paste raw incident text, generate and save a report;
//! - digest a Slack channel, optionally posting the report back;
//! - browse previously saved reports.

use axum::{
    Form, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{CopilotError, Void},
    },
    copilot::IncidentCopilot,
    service::{chat::ChatClient, store::ReportStore},
};

// Structs.

/// Shared state for the web handlers.
#[derive(Clone)]
struct WebState {
    config: Config,
    copilot: IncidentCopilot,
    chat: Option<ChatClient>,
    store: ReportStore,
}

/// Form body for the paste-text page.
#[derive(Deserialize)]
struct AnalyzeForm {
    raw_text: String,
    #[serde(default)]
    model: String,
}

/// Form body for the Slack digest page.
#[derive(Deserialize)]
struct SlackDigestForm {
    channel_id: String,
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    post_back: Option<String>,
}

/// Error wrapper that renders as a readable HTML page.
struct WebError(anyhow::Error);

impl From<anyhow::Error> for WebError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<CopilotError> for WebError {
    fn from(e: CopilotError) -> Self {
        Self(e.into())
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self.0.downcast_ref::<CopilotError>() {
            Some(CopilotError::EmptyInput | CopilotError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            Some(CopilotError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Some(_) => StatusCode::BAD_GATEWAY,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let advice = self.0.downcast_ref::<CopilotError>().map(|e| e.advice()).unwrap_or("Check the server logs for details.");

        let body = page(
            "Error",
            &format!("<p class=\"error\">❌ {}</p><p>{}</p><p><a href=\"/\">← Back</a></p>", escape_html(&self.0.to_string()), advice),
        );

        (self.status_code(), Html(body)).into_response()
    }
}

// Entry point.

/// Serve the web front end on `bind` until the process is stopped.
#[instrument(skip_all)]
pub async fn serve(config: &Config, bind: &str) -> Void {
    let copilot = IncidentCopilot::new(config);

    // The Slack digest page only lights up when a bot token is configured.
    let chat = if config.has_slack() {
        Some(ChatClient::slack(config, copilot.clone()).await?)
    } else {
        None
    };

    let state = WebState {
        config: config.clone(),
        copilot,
        chat,
        store: ReportStore::new(&config.output_dir),
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/report", post(generate_report))
        .route("/slack-report", post(slack_digest))
        .route("/reports", get(list_reports))
        .route("/reports/{name}", get(view_report))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;

    info!("Web front end listening on http://{}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}

// Handlers.

/// GET `/`: the landing page with both input forms.
async fn index(State(state): State<WebState>) -> Html<String> {
    let mut body = String::new();

    body.push_str("<p>Transform messy incident notes into professional reports.</p>");

    body.push_str(
        r#"<h2>📝 Paste Incident Notes</h2>
<form method="post" action="/report">
<p><textarea name="raw_text" rows="12" placeholder="prod db slow, users reporting 500 errors starting around 2:45pm
checked logs - connection pool maxed out
dave restarted db at 3:10
errors stopped at 3:15
need to fix cron schedule and add monitoring"></textarea></p>
<p><label>Model override (optional): <input type="text" name="model"></label></p>
<p><button type="submit">Generate Report</button></p>
</form>"#,
    );

    if state.chat.is_some() {
        body.push_str(&format!(
            r#"<h2>💬 Analyze Slack Channel</h2>
<form method="post" action="/slack-report">
<p><label>Channel ID: <input type="text" name="channel_id" placeholder="C01234ABCDE"></label></p>
<p><label>Messages to analyze: <input type="number" name="limit" min="1" max="1000" value="{}"></label></p>
<p><label><input type="checkbox" name="post_back"> Post the report back to the channel</label></p>
<p><button type="submit">Fetch &amp; Analyze</button></p>
</form>"#,
            state.config.slack_message_limit
        ));
    } else {
        body.push_str("<p>⚠️ Slack is not configured; channel digests are unavailable.</p>");
    }

    body.push_str(r#"<p><a href="/reports">📊 View saved reports</a></p>"#);

    Html(page("Home", &body))
}

/// POST `/report`: run the pipeline over pasted text.
#[instrument(skip_all)]
async fn generate_report(State(state): State<WebState>, Form(form): Form<AnalyzeForm>) -> Result<Html<String>, WebError> {
    let model = match form.model.trim() {
        "" => None,
        m => Some(m),
    };

    let report = state.copilot.parse_incident(&form.raw_text, model).await?;
    let markdown = state.copilot.format_markdown(&report);

    let path = state.store.save(&markdown).await?;

    let body = format!(
        "<p>✅ Report generated and saved to <code>{}</code>.</p><pre>{}</pre><p><a href=\"/\">← Back</a></p>",
        escape_html(&path.display().to_string()),
        escape_html(&markdown),
    );

    Ok(Html(page("Report", &body)))
}

/// POST `/slack-report`: digest a Slack channel into a report.
#[instrument(skip_all)]
async fn slack_digest(State(state): State<WebState>, Form(form): Form<SlackDigestForm>) -> Result<Html<String>, WebError> {
    let Some(chat) = &state.chat else {
        return Err(WebError(anyhow::anyhow!("Slack is not configured; set `slack_bot_token` first.")));
    };

    let channel_id = form.channel_id.trim();

    if channel_id.is_empty() {
        return Err(CopilotError::InvalidArgument("channel ID is required".to_string()).into());
    }

    let limit = parse_limit(form.limit.as_deref())?.unwrap_or(state.config.slack_message_limit);

    let messages = chat.fetch_messages(channel_id, limit).await?;

    if messages.is_empty() {
        return Err(WebError(anyhow::anyhow!("No messages found in channel {channel_id}.")));
    }

    let raw_text = messages.join("\n");

    let report = state.copilot.parse_incident(&raw_text, None).await?;
    let markdown = state.copilot.format_markdown(&report);

    let path = state.store.save(&markdown).await?;

    let mut notes = format!(
        "<p>✅ Report generated from {} messages and saved to <code>{}</code>.</p>",
        messages.len(),
        escape_html(&path.display().to_string()),
    );

    if form.post_back.is_some() {
        let reply = format!("📊 **Incident Report Generated**\n\n```\n{markdown}\n```");

        chat.post_message(channel_id, &reply, None).await?;
        notes.push_str("<p>📤 Posted back to the channel.</p>");
    }

    let body = format!("{notes}<pre>{}</pre><p><a href=\"/\">← Back</a></p>", escape_html(&markdown));

    Ok(Html(page("Slack Report", &body)))
}

/// GET `/reports`: list saved reports, newest first.
async fn list_reports(State(state): State<WebState>) -> Result<Html<String>, WebError> {
    let names = state.store.list().await?;

    let body = if names.is_empty() {
        "<p>No reports found. Generate one first!</p>".to_string()
    } else {
        let items = names
            .iter()
            .map(|n| format!("<li><a href=\"/reports/{}\">{}</a></li>", escape_html(n), escape_html(n)))
            .collect::<String>();

        format!("<p>Found {} saved reports.</p><ul>{items}</ul>", names.len())
    };

    Ok(Html(page("Saved Reports", &format!("{body}<p><a href=\"/\">← Back</a></p>"))))
}

/// GET `/reports/{name}`: one saved report as plain markdown.
async fn view_report(State(state): State<WebState>, Path(name): Path<String>) -> Response {
    match state.store.read(&name).await {
        Ok(contents) => ([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], contents).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Report not found.").into_response(),
    }
}

// Helpers.

/// Parse the optional message-limit form field ("" means "use the default").
fn parse_limit(limit: Option<&str>) -> Result<Option<u16>, CopilotError> {
    let Some(raw) = limit.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    raw.parse::<u16>()
        .map(Some)
        .map_err(|_| CopilotError::InvalidArgument(format!("message limit must be a number, got `{raw}`")))
}

/// Minimal HTML escaping for text interpolated into pages.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Shared page chrome.
fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title} · Incident Copilot</title>
<style>
body {{ font-family: sans-serif; max-width: 56rem; margin: 2rem auto; padding: 0 1rem; }}
textarea, input[type="text"] {{ width: 100%; font-family: monospace; }}
pre {{ background: #f6f8fa; padding: 1rem; overflow-x: auto; white-space: pre-wrap; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>🚨 Incident Copilot</h1>
{body}
</body>
</html>"#
    )
}

// Tests.
