use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::PricingError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 200;

pub(crate) fn build_client(vendor: &'static str) -> Result<Client, PricingError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|source| PricingError::Transport { vendor, source })
}

/// Decodes a JSON body, turning non-2xx statuses into `PricingError::Status`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    vendor: &'static str,
    response: Response,
) -> Result<T, PricingError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PricingError::Status {
            vendor,
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| PricingError::Transport { vendor, source })?;
    serde_json::from_slice(&bytes).map_err(|err| PricingError::Payload {
        vendor,
        detail: err.to_string(),
    })
}
