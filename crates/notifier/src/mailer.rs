//! Mail transport trait and implementations.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur while sending mail.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The mail API rejected the request.
    #[error("mail API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Bad or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPayload {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Trait for sending emails.
///
/// Abstracted to support different transports (HTTP mail API, tests, etc.).
/// Implementations make exactly one delivery attempt; retrying is the
/// caller's decision.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single email.
    async fn send(&self, email: &EmailPayload) -> Result<(), NotifyError>;
}

/// A mailer that discards everything and reports success. Used when no mail
/// credentials are configured, matching the demo behavior of skipping email
/// without blocking the flow.
#[derive(Debug, Clone, Default)]
pub struct NoOpMailer;

#[async_trait]
impl Mailer for NoOpMailer {
    async fn send(&self, _email: &EmailPayload) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// A mailer that logs instead of sending. Useful for local debugging.
#[derive(Debug, Clone, Default)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, email: &EmailPayload) -> Result<(), NotifyError> {
        tracing::info!("[mail] to={} subject={:?}", email.to, email.subject);
        Ok(())
    }
}

/// A mailer that records every payload it is asked to send. Test double.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailPayload>>,
    fail_with: Option<String>,
}

impl RecordingMailer {
    /// A recording mailer that delivers successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording mailer whose every send fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Payloads recorded so far.
    pub async fn sent(&self) -> Vec<EmailPayload> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &EmailPayload) -> Result<(), NotifyError> {
        self.sent.lock().await.push(email.clone());
        match &self.fail_with {
            Some(message) => Err(NotifyError::Network(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> EmailPayload {
        EmailPayload {
            to: "ops@tickettrack.com".to_string(),
            subject: "[New Ticket] Cannot login".to_string(),
            html_body: "<h1>New Ticket Created</h1>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_noop_mailer() {
        NoOpMailer.send(&payload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_recording_mailer_captures() {
        let mailer = RecordingMailer::new();
        mailer.send(&payload()).await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ops@tickettrack.com");
    }

    #[tokio::test]
    async fn test_failing_mailer_still_records() {
        let mailer = RecordingMailer::failing("connection refused");
        let result = mailer.send(&payload()).await;

        assert!(matches!(result, Err(NotifyError::Network(_))));
        assert_eq!(mailer.sent().await.len(), 1);
    }
}
