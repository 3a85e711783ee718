use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::alerts::domain::{Alert, AlertId, NewAlert};
use crate::alerts::repository::{AlertStore, StoreError};

const ALERTS_TABLE: &str = "alerts";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `alerts` table behind Supabase's PostgREST endpoint.
pub struct SupabaseAlertStore {
    http: Client,
    table_url: String,
    api_key: String,
}

impl std::fmt::Debug for SupabaseAlertStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseAlertStore")
            .field("table_url", &self.table_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct PriceUpdate {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    last_price: Decimal,
}

impl SupabaseAlertStore {
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(Self {
            http,
            table_url: format!(
                "{}/rest/v1/{ALERTS_TABLE}",
                project_url.trim_end_matches('/')
            ),
            api_key: api_key.into(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let response = ensure_success(response).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|err| StoreError::Payload(err.to_string()))
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message: message.chars().take(200).collect(),
    })
}

#[async_trait]
impl AlertStore for SupabaseAlertStore {
    async fn insert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let request = self
            .authorized(self.http.post(&self.table_url))
            .header("Prefer", "return=representation")
            .json(&[alert]);

        Self::rows::<Alert>(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Payload("insert returned no rows".to_string()))
    }

    async fn list(&self) -> Result<Vec<Alert>, StoreError> {
        let request = self
            .authorized(self.http.get(&self.table_url))
            .query(&[("select", "*"), ("order", "id.asc")]);
        Self::rows(request).await
    }

    async fn update_last_price(&self, id: AlertId, price: Decimal) -> Result<(), StoreError> {
        let request = self
            .authorized(self.http.patch(&self.table_url))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&PriceUpdate { last_price: price });

        let updated: Vec<Alert> = Self::rows(request).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
