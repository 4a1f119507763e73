//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Prompt sent upstream when `CHAT_PROMPT` is not set
pub const DEFAULT_PROMPT: &str = "Tell me a fun fact about Java";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// OpenAI API configuration
    pub openai: OpenAIConfig,
    /// Chat options applied to every upstream call
    pub chat: ChatConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Upstream model name
    pub model: String,
    /// Sampling temperature (optional)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate (optional)
    pub max_tokens: Option<u32>,
    /// Prompt sent by every endpoint
    pub prompt: String,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
    /// Whether CORS is enabled
    pub cors_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter, a bare level or `RUST_LOG` directives
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration instance reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or_default = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| default.to_string())
        };

        let settings = Self {
            server: ServerConfig {
                host: get_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_or_default("SERVER_PORT", "8080")
                    .parse()
                    .context("Invalid port number")?,
            },
            openai: OpenAIConfig {
                api_key: lookup("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY environment variable not set")?,
                base_url: get_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                timeout: get_or_default("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            chat: ChatConfig {
                model: get_or_default("OPENAI_MODEL", "gpt-4o-mini"),
                temperature: lookup("OPENAI_TEMPERATURE")
                    .map(|v| v.parse::<f32>())
                    .transpose()
                    .context("Invalid temperature value")?,
                max_tokens: lookup("OPENAI_MAX_TOKENS")
                    .map(|v| v.parse::<u32>())
                    .transpose()
                    .context("Invalid max tokens value")?,
                prompt: get_or_default("CHAT_PROMPT", DEFAULT_PROMPT),
            },
            security: SecurityConfig {
                allowed_origins: get_or_default("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                cors_enabled: get_or_default("CORS_ENABLED", "true")
                    .parse()
                    .context("Invalid CORS enabled flag")?,
            },
            logging: LoggingConfig {
                level: get_or_default("RUST_LOG", "info"),
                format: get_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if self.openai.api_key.is_empty() {
            anyhow::bail!("OpenAI API key cannot be empty");
        }

        if self.openai.api_key.contains(char::is_whitespace) {
            anyhow::bail!("OpenAI API key cannot contain whitespace characters");
        }

        if self.openai.api_key.chars().count() < 8 {
            anyhow::bail!("OpenAI API key must be at least 8 characters long");
        }

        if !self.openai.base_url.starts_with("http") {
            anyhow::bail!("Invalid OpenAI base URL format, should start with 'http'");
        }

        if self.openai.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.chat.model.trim().is_empty() {
            anyhow::bail!("Model name cannot be empty");
        }

        if self.chat.prompt.trim().is_empty() {
            anyhow::bail!("Prompt cannot be empty");
        }

        if let Some(temperature) = self.chat.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                anyhow::bail!("Temperature must be between 0.0 and 2.0, got {}", temperature);
            }
        }

        if self.chat.max_tokens == Some(0) {
            anyhow::bail!("Maximum tokens cannot be 0");
        }

        // Bare levels and full `RUST_LOG` directive lists are both accepted
        if self.logging.level.trim().is_empty() || EnvFilter::try_new(&self.logging.level).is_err() {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Full URL of the chat completions endpoint
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.openai.base_url.trim_end_matches('/'))
    }

    /// Whether every origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.security.allowed_origins.is_empty()
            || self.security.allowed_origins.iter().any(|o| o == "*")
    }
}
