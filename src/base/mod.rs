//! Core components, types, and utilities for the incident copilot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The extraction prompt and its config override.
//! - Common types, the error taxonomy, and result handling.

pub mod config;
pub mod prompts;
pub mod types;
