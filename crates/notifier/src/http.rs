//! HTTP mail API transport.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::mailer::{EmailPayload, Mailer, NotifyError};

/// Configuration for the HTTP mail transport.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Mail API endpoint receiving a JSON message payload.
    pub api_url: String,
    /// Bearer token for the mail API.
    pub api_key: String,
    /// From address on outgoing mail.
    pub from: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            from: "\"TicketTrack\" <noreply@tickettrack.com>".to_string(),
        }
    }
}

impl MailerConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `MAIL_API_URL` - mail API endpoint
    /// - `MAIL_API_KEY` - bearer token
    ///
    /// Optional:
    /// - `MAIL_FROM` - from address (default: "TicketTrack" <noreply@tickettrack.com>)
    pub fn from_env() -> Result<Self, NotifyError> {
        let api_url = env::var("MAIL_API_URL")
            .map_err(|_| NotifyError::Configuration("MAIL_API_URL not set".to_string()))?;
        let api_key = env::var("MAIL_API_KEY")
            .map_err(|_| NotifyError::Configuration("MAIL_API_KEY not set".to_string()))?;
        let from = env::var("MAIL_FROM").unwrap_or_else(|_| MailerConfig::default().from);

        Ok(Self {
            api_url,
            api_key,
            from,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Mailer that POSTs messages to an HTTP mail API.
pub struct HttpMailer {
    client: Client,
    config: MailerConfig,
}

impl HttpMailer {
    /// Create a new HTTP mailer with the given configuration.
    pub fn new(config: MailerConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().build().map_err(|e| {
            NotifyError::Configuration(format!("Failed to create HTTP client: {e}"))
        })?;
        Ok(Self { client, config })
    }

    /// Create an HTTP mailer from environment variables.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::new(MailerConfig::from_env()?)
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &EmailPayload) -> Result<(), NotifyError> {
        let request = SendMailRequest {
            from: &self.config.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html_body,
        };

        debug!("Sending mail to {} via {}", email.to, self.config.api_url);

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Network(format!("Failed to send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Mail accepted for {}", email.to);
        Ok(())
    }
}
