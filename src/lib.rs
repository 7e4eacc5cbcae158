//! Library root for `incident-copilot`.
//!
//! Incident-copilot turns messy incident material (chat transcripts, ticket
//! notes, pasted logs) into a consistent, structured write-up:
//! - Delegates the extraction itself to an LLM completion endpoint
//! - Validates the model output against a strict report schema
//! - Renders the validated report to deterministic markdown
//! - Surfaces the pipeline via a CLI, a web form, and Slack
//!
//! The architecture is built around extensible traits that allow for
//! different implementations of each remote service.

pub mod base;
pub mod copilot;
pub mod interaction;
pub mod prelude;
pub mod report;
pub mod runtime;
pub mod service;
pub mod web;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Install the process-wide TLS crypto provider.
///
/// Every entry point that builds a Slack client calls this; only the first
/// call takes effect.
pub fn install_crypto_provider() {
    let _ = crypto::ring::default_provider().install_default();
}

/// Public async entry for the realtime bot.
///
/// Sets up necessary services and starts the copilot runtime:
/// - Installs the crypto provider
/// - Creates the runtime context with the pipeline and chat client
/// - Starts the socket-mode event loop for processing triggers
pub async fn start(config: Config) -> Void {
    info!("Starting incident-copilot bot ...");

    // Start the crypto provider.
    install_crypto_provider();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
