//! Middleware module
//!
//! HTTP request logging and the token usage logging wrapper around chat calls

pub mod logging;
pub mod usage;

pub use logging::request_logging_middleware;
pub use usage::{log_token_usage, UsageReport};
