use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::alerts::domain::{Alert, AlertId, NewAlert};
use crate::alerts::repository::{AlertStore, StoreError};

/// Process-local store used in development and tests. Contents are lost on
/// restart.
#[derive(Debug, Clone)]
pub struct InMemoryAlertStore {
    records: Arc<Mutex<BTreeMap<AlertId, Alert>>>,
    sequence: Arc<AtomicI64>,
}

impl Default for InMemoryAlertStore {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            sequence: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl InMemoryAlertStore {
    /// Seeds the store with existing rows, keeping their ids.
    pub fn with_alerts(alerts: impl IntoIterator<Item = Alert>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("alert store mutex poisoned");
            for alert in alerts {
                store.sequence.fetch_max(alert.id.0 + 1, Ordering::Relaxed);
                guard.insert(alert.id, alert);
            }
        }
        store
    }

    pub fn get(&self, id: AlertId) -> Option<Alert> {
        self.records
            .lock()
            .expect("alert store mutex poisoned")
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn insert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let id = AlertId(self.sequence.fetch_add(1, Ordering::Relaxed));
        let stored = alert.into_alert(id);
        self.records
            .lock()
            .expect("alert store mutex poisoned")
            .insert(id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Alert>, StoreError> {
        let guard = self.records.lock().expect("alert store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    async fn update_last_price(&self, id: AlertId, price: Decimal) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("alert store mutex poisoned");
        match guard.get_mut(&id) {
            Some(alert) => {
                alert.last_price = price;
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }
}
