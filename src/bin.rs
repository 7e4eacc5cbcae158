//! Binary entry point for `incident-copilot`.
//!
//! This module provides the command-line interface for the copilot with
//! options for configuration file paths and logging verbosity, and one
//! subcommand per front end (one-shot analysis, Slack digest, the realtime
//! bot, and the web form).

use std::io::{IsTerminal, Read};

use clap::{Parser, Subcommand};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

use incident_copilot::{
    base::{
        config::Config,
        types::{CopilotError, Void},
    },
    copilot::IncidentCopilot,
    service::{chat::ChatClient, store::ReportStore},
};

/// Incident-copilot – turn messy incident notes into structured reports.
///
/// Configuration can come from `copilot.toml` or environment variables
/// prefixed with `INCIDENT_COPILOT_`. The pipeline sends raw text to an LLM
/// completion endpoint, validates the extraction against a strict schema,
/// and renders deterministic markdown.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the tool will look for a config file at `copilot.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze incident text from a file (or stdin) and print the report.
    Analyze {
        /// Path to a file with raw incident text; reads stdin when omitted.
        file: Option<std::path::PathBuf>,
        /// Use a different completion model for this run.
        #[arg(short, long)]
        model: Option<String>,
        /// Skip saving the rendered report to the output directory.
        #[arg(long)]
        no_save: bool,
    },
    /// Summarize a Slack channel's recent history into a report.
    Slack {
        /// Channel ID to fetch messages from.
        #[arg(short = 'C', long)]
        channel: String,
        /// Number of messages to fetch (defaults to the configured limit).
        #[arg(short, long)]
        limit: Option<u16>,
        /// Post the generated report back to the channel.
        #[arg(long)]
        post: bool,
    },
    /// Run the realtime Slack bot (socket mode).
    Bot,
    /// Serve the web front end.
    Serve {
        /// Override the configured bind address.
        #[arg(short, long)]
        bind: Option<String>,
    },
}

/// Main entry point for the incident-copilot binary.
///
/// Sets up logging based on verbosity, loads configuration, and dispatches
/// to the selected front end.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    init_tracing(args.verbose)?;

    let config = Config::load(args.config.as_deref())?;

    let result = match args.command {
        Command::Analyze { file, model, no_save } => analyze(&config, file.as_deref(), model.as_deref(), no_save).await,
        Command::Slack { channel, limit, post } => slack_digest(&config, &channel, limit, post).await,
        Command::Bot => incident_copilot::start(config.clone()).await,
        Command::Serve { bind } => serve_web(&config, bind.as_deref()).await,
    };

    if let Err(err) = result {
        // Classified pipeline failures get a short, actionable message
        // instead of a backtrace dump.
        if let Some(copilot_err) = err.downcast_ref::<CopilotError>() {
            eprintln!("❌ {copilot_err}. {}", copilot_err.advice());
            std::process::exit(1);
        }

        return Err(err);
    }

    Ok(())
}

/// Analyze raw text from a file or stdin, print and save the report.
async fn analyze(config: &Config, file: Option<&std::path::Path>, model: Option<&str>, no_save: bool) -> Void {
    let raw_text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            if std::io::stdin().is_terminal() {
                eprintln!("Enter incident notes (press Ctrl+D when done):");
            }

            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let copilot = IncidentCopilot::new(config);

    let report = copilot.parse_incident(&raw_text, model).await?;
    let markdown = copilot.format_markdown(&report);

    // The report goes to stdout; everything else stays on stderr.
    println!("{markdown}");

    if !no_save {
        let store = ReportStore::new(&config.output_dir);
        let path = store.save(&markdown).await?;

        eprintln!("✅ Report saved to: {}", path.display());
    }

    Ok(())
}

/// Digest a Slack channel's history into a report, optionally posting it back.
async fn slack_digest(config: &Config, channel: &str, limit: Option<u16>, post: bool) -> Void {
    incident_copilot::install_crypto_provider();

    let copilot = IncidentCopilot::new(config);
    let chat = ChatClient::slack(config, copilot.clone()).await?;

    let limit = limit.unwrap_or(config.slack_message_limit);

    eprintln!("Fetching messages from channel {channel} ...");

    let messages = chat.fetch_messages(channel, limit).await?;

    if messages.is_empty() {
        return Err(anyhow::anyhow!("No messages found in channel {channel}."));
    }

    eprintln!("Found {} messages. Analyzing ...", messages.len());

    let raw_text = messages.join("\n");

    let report = copilot.parse_incident(&raw_text, None).await?;
    let markdown = copilot.format_markdown(&report);

    println!("{markdown}");

    if post {
        let reply = format!("📊 **Incident Report Generated**\n\n```\n{markdown}\n```");

        chat.post_message(channel, &reply, None).await?;

        eprintln!("✅ Report posted to Slack.");
    }

    Ok(())
}

/// Serve the web front end.
async fn serve_web(config: &Config, bind: Option<&str>) -> Void {
    incident_copilot::install_crypto_provider();

    let bind = bind.unwrap_or(&config.web_bind_addr);

    incident_copilot::web::serve(config, bind).await
}

/// Wire up the tracing stack.
///
/// Log lines go to stderr so stdout stays clean for rendered reports. The
/// otlp layer is opt-in via the standard endpoint variable.
fn init_tracing(verbose: u8) -> Void {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(level_filter).with(stderr);

    // Prepare the otlp layer.

    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("incident-copilot");
        let otel = tracing_opentelemetry::layer().with_tracer(tracer);

        registry.with(otel).init();
    } else {
        registry.init();
    }

    Ok(())
}
