//! Error types for the mail adapter.

use thiserror::Error;

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// Errors that can occur while validating, mapping or sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// A required field on a recipient, message or mapped request is missing
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Adapter configuration is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template compilation or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// The outgoing request could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Connection or timeout failure from the HTTP exchange
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider response body was not the expected JSON
    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    /// The provider answered a single-recipient send with no status records
    #[error("{0}: received zero length response")]
    EmptyResponse(&'static str),

    /// The provider rejected the whole call with a structured error
    #[error(
        "email sent to {recipients} recipients starting with {first_recipient} failed: {message} ({name}, code {code})"
    )]
    Provider {
        /// Status string reported by the provider (usually "error")
        status: String,
        /// Provider error code
        code: i64,
        /// Provider error name, e.g. "Invalid_Key"
        name: String,
        /// Human readable provider message
        message: String,
        /// Number of recipients on the failed request
        recipients: usize,
        /// Email of the first recipient on the failed request
        first_recipient: String,
    },
}

impl MailError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<handlebars::TemplateError> for MailError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for MailError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}
