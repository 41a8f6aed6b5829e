//! Configuration management for Mailgate.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

use crate::error::Result;

/// Main configuration for the Mailgate service.
///
/// All values are sourced from the process environment (optionally seeded
/// from a local `.env` file before startup). Field names map to upper-case
/// environment variables: `port` ← `PORT`, `email_from` ← `EMAIL_FROM`,
/// and so on. List values are comma-separated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailgateConfig {
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS, as an explicit allow-list
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Proxy addresses trusted to set `X-Forwarded-For`
    #[serde(default = "default_trusted_proxies")]
    pub trusted_proxies: Vec<IpAddr>,

    /// SMTP relay hostname
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port (STARTTLS)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// From address for outbound mail; also the SMTP account name
    pub email_from: String,

    /// Destination address for contact submissions
    pub email_to: String,

    /// SMTP app password for the sending account
    pub email_app_password: String,
}

fn default_port() -> u16 {
    8080
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_trusted_proxies() -> Vec<IpAddr> {
    vec!["127.0.0.1".parse().unwrap()]
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl MailgateConfig {
    /// Load configuration from the process environment.
    ///
    /// Missing optional keys fall back to defaults; missing required keys
    /// (the mail credentials) fail the load.
    pub fn from_env() -> Result<Self> {
        let source = config::Environment::default()
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cors_allowed_origins")
            .with_list_parse_key("trusted_proxies");

        let config = config::Config::builder().add_source(source).build()?;
        Ok(config.try_deserialize()?)
    }

    /// The socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
