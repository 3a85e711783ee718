use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{build_client, ensure_accepted, EmailMessage, MailError, Mailer};

const PROVIDER: &str = "resend";
pub const RESEND_API: &str = "https://api.resend.com";

pub struct ResendMailer {
    http: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        Self::with_base_url(RESEND_API, api_key)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, MailError> {
        Ok(Self {
            http: build_client(PROVIDER)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = SendEmail {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| MailError::Transport {
                provider: PROVIDER,
                source,
            })?;

        ensure_accepted(PROVIDER, response).await
    }
}
