//! Event handling for the realtime bot.
//!
//! This module turns chat triggers (slash commands, keywords, reactions)
//! into incident-report work: fetching channel history, running the
//! pipeline, and posting the result back without blocking the listener.

pub mod incident_request;
