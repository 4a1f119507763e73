//! Service layer module
//!
//! Contains the chat client used by the HTTP handlers

pub mod chat;

pub use chat::{ChatClient, ChatOptions};
