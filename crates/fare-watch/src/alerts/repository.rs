use async_trait::async_trait;
use rust_decimal::Decimal;

use super::domain::{Alert, AlertId, NewAlert};

/// Storage abstraction so the service module can be exercised in isolation.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert(&self, alert: NewAlert) -> Result<Alert, StoreError>;
    async fn list(&self) -> Result<Vec<Alert>, StoreError>;
    /// Overwrites the single remembered price; no history is kept.
    async fn update_last_price(&self, id: AlertId, price: Decimal) -> Result<(), StoreError>;
}

/// Error enumeration for datastore failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("alert {0} not found")]
    NotFound(AlertId),
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
    #[error("datastore rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("datastore returned an unreadable payload: {0}")]
    Payload(String),
}
