//! Mail relay module for outbound contact submissions.

mod relay;

pub use relay::{ContactSubmission, MailRelay, SmtpRelay};
