//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the copilot:
//! - Chat services (e.g., Slack)
//! - LLM completion services (e.g., OpenAI)
//! - Report persistence
//!
//! Each remote service module defines both a generic trait and a concrete
//! implementation, allowing for extensibility and easy testing.

pub mod chat;
pub mod llm;
pub mod store;
