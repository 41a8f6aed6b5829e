//! Error types for the Mailgate service.

use thiserror::Error;

/// Main error type for Mailgate operations.
#[derive(Error, Debug)]
pub enum MailgateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid CORS origin in configuration
    #[error("Invalid CORS origin: {0}")]
    Cors(#[from] axum::http::header::InvalidHeaderValue),

    /// Invalid mail address in configuration
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Errors constructing the outbound message
    #[error("Mail message error: {0}")]
    MailMessage(#[from] lettre::error::Error),

    /// SMTP transport errors
    #[error("SMTP error: {0}")]
    MailTransport(#[from] lettre::transport::smtp::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Mailgate operations.
pub type Result<T> = std::result::Result<T, MailgateError>;
