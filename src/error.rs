use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Missing required attribute(s): {}", .0.join(", "))]
    #[diagnostic(
        code(event_countdown::missing_attributes),
        help("Set non-empty \"calendar-id\" and \"api-key\" attributes on the container")
    )]
    MissingAttributes(Vec<&'static str>),

    #[error("Environment error: {0}")]
    #[diagnostic(code(event_countdown::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(event_countdown::config))]
    Config(String),

    #[error("Markup error: {0}")]
    #[diagnostic(code(event_countdown::markup))]
    Markup(String),

    #[error("Calendar request failed: {0}")]
    #[diagnostic(code(event_countdown::fetch))]
    Fetch(String),

    #[error("Calendar API returned HTTP {status}: {body}")]
    #[diagnostic(code(event_countdown::http))]
    Http { status: u16, body: String },

    #[error("Failed to parse calendar response: {0}")]
    #[diagnostic(code(event_countdown::parse))]
    Parse(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(event_countdown::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(event_countdown::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(event_countdown::serialization))]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Markup(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CountdownResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create markup errors
pub fn markup_error(message: &str) -> Error {
    Error::Markup(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create calendar fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create response parsing errors
pub fn parse_error(message: &str) -> Error {
    Error::Parse(message.to_string())
}
