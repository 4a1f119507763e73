//! Configuration management module
//!
//! Loads application settings from environment variables and an optional `.env` file.

pub mod settings;

pub use settings::{ChatConfig, LoggingConfig, OpenAIConfig, SecurityConfig, ServerConfig, Settings};
