use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{build_client, ensure_accepted, EmailMessage, MailError, Mailer};

const PROVIDER: &str = "sendgrid";
pub const SENDGRID_API: &str = "https://api.sendgrid.com";

/// v3 mail-send transport. The sender must be a verified SendGrid identity.
pub struct SendGridMailer {
    http: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SendGridMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridMailer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        Self::with_base_url(SENDGRID_API, api_key)
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
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = MailSend {
            personalizations: [Personalization {
                to: [Address { email: &message.to }],
            }],
            from: Address {
                email: &message.from,
            },
            subject: &message.subject,
            content: [Content {
                kind: "text/html",
                value: &message.html,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
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
