//! Transactional mail transports.

pub mod resend;
pub mod sendgrid;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::info;

pub use resend::ResendMailer;
pub use sendgrid::SendGridMailer;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A rendered HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} rejected the message with status {status}: {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

/// Outbound mail hook used by the alert flows.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Development transport: logs the message instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            bytes = message.html.len(),
            "mail transport not configured, message logged only"
        );
        Ok(())
    }
}

fn build_client(provider: &'static str) -> Result<Client, MailError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|source| MailError::Transport { provider, source })
}

async fn ensure_accepted(provider: &'static str, response: Response) -> Result<(), MailError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(MailError::Rejected {
        provider,
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}
