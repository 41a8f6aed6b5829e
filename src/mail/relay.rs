//! Outbound mail delivery over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::MailgateConfig;
use crate::error::Result;

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactSubmission {
    /// Sender display name
    pub name: String,
    /// Sender email address
    pub email: String,
    /// Free-text message body
    pub message: String,
}

/// Trait for mail delivery implementations.
///
/// This seam lets the HTTP handler path run against a recording double in
/// tests instead of a live SMTP connection.
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Deliver a contact submission as an email.
    async fn deliver(&self, submission: &ContactSubmission) -> Result<()>;
}

/// SMTP-backed relay that forwards submissions to a configured mailbox.
pub struct SmtpRelay {
    /// Async SMTP transport (STARTTLS, authenticated)
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// Configured From address
    from: Mailbox,
    /// Configured To address
    to: Mailbox,
}

impl SmtpRelay {
    /// Create a relay from the service configuration.
    ///
    /// The SMTP account name is the configured From address, authenticated
    /// with the configured app password.
    pub fn from_config(config: &MailgateConfig) -> Result<Self> {
        let credentials = Credentials::new(
            config.email_from.clone(),
            config.email_app_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        debug!(
            host = %config.smtp_host,
            port = config.smtp_port,
            "SMTP transport configured"
        );

        Ok(Self {
            transport,
            from: config.email_from.parse()?,
            to: config.email_to.parse()?,
        })
    }

    /// Build the outbound message for a submission.
    fn build_message(&self, submission: &ContactSubmission) -> Result<Message> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject(submission))
            .header(ContentType::TEXT_PLAIN)
            .body(body(submission))?;
        Ok(message)
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn deliver(&self, submission: &ContactSubmission) -> Result<()> {
        let message = self.build_message(submission)?;
        self.transport.send(message).await?;
        info!(to = %self.to, "Contact submission relayed");
        Ok(())
    }
}

/// Subject line for a submission.
fn subject(submission: &ContactSubmission) -> String {
    format!("Contact Form Submission {}", submission.name)
}

/// Plaintext body listing the submission fields.
fn body(submission: &ContactSubmission) -> String {
    format!(
        "Name: {}\nEmail: {}\nMessage: {}",
        submission.name, submission.email, submission.message
    )
}
