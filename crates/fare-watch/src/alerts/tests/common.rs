use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::alerts::domain::{Alert, AlertId, AlertRequest, NewAlert};
use crate::alerts::repository::{AlertStore, StoreError};
use crate::alerts::service::AlertService;
use crate::alerts::{alert_router, AlertApi};
use crate::config::AlertSettings;
use crate::mail::{EmailMessage, MailError, Mailer};
use crate::pricing::{
    AirportDirectory, AirportSuggestion, FareQuery, FareQuoteSource, FareTracker, PriceInsights,
    PriceQuartiles, PricingError, TrackedFare,
};
use crate::store::InMemoryAlertStore;

pub(super) const SENDER: &str = "alertas@example.com";

pub(super) fn settings() -> AlertSettings {
    AlertSettings {
        mail_from: SENDER.to_string(),
        currency: "BRL".to_string(),
    }
}

pub(super) fn request() -> AlertRequest {
    AlertRequest {
        origin: Some("gru".to_string()),
        destination: Some("rec".to_string()),
        departure_date: Some("2026-12-18".to_string()),
        return_date: None,
        passengers: Some(2),
        user_email: Some("viajante@example.com".to_string()),
        short_duration: Some(false),
    }
}

pub(super) fn stored_alert(id: i64, origin: &str, destination: &str, price: i64) -> Alert {
    NewAlert {
        user_email: format!("viajante{id}@example.com"),
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_date: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
        return_date: None,
        passengers: 1,
        last_price: Decimal::new(price, 0),
        purchase_link: format!(
            "https://www.skyscanner.com.br/transport/flights/{}/{}/261218/",
            origin.to_ascii_lowercase(),
            destination.to_ascii_lowercase()
        ),
        short_duration: false,
    }
    .into_alert(AlertId(id))
}

fn vendor_down() -> PricingError {
    PricingError::Status {
        vendor: "fake",
        status: 503,
        body: "unavailable".to_string(),
    }
}

/// Quote source with a fixed answer; counts calls so tests can assert that
/// invalid input never reaches the vendor.
#[derive(Default)]
pub(super) struct FakeQuotes {
    pub offer: Option<Decimal>,
    pub quartiles: Option<PriceQuartiles>,
    pub offers_fail: bool,
    pub metrics_fail: bool,
    pub calls: AtomicUsize,
    pub last_query: Mutex<Option<FareQuery>>,
}

impl FakeQuotes {
    pub fn offering(price: i64) -> Self {
        Self {
            offer: Some(Decimal::new(price, 0)),
            ..Self::default()
        }
    }

    pub fn with_quartiles(mut self, first: i64, third: i64) -> Self {
        self.quartiles = Some(PriceQuartiles {
            first: Decimal::new(first, 0),
            third: Decimal::new(third, 0),
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FareQuoteSource for FakeQuotes {
    async fn cheapest_offer(&self, query: &FareQuery) -> Result<Option<Decimal>, PricingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().expect("query mutex poisoned") = Some(query.clone());
        if self.offers_fail {
            return Err(vendor_down());
        }
        Ok(self.offer)
    }

    async fn price_metrics(
        &self,
        _query: &FareQuery,
    ) -> Result<Option<PriceQuartiles>, PricingError> {
        if self.metrics_fail {
            return Err(vendor_down());
        }
        Ok(self.quartiles)
    }
}

pub(super) enum TrackerReply {
    Fare(Decimal, Option<PriceInsights>),
    Nothing,
    Failure,
}

/// Tracker keyed by `ORIGIN-DESTINATION`; unknown routes have no fare.
#[derive(Default)]
pub(super) struct FakeTracker {
    replies: HashMap<String, TrackerReply>,
}

impl FakeTracker {
    pub fn reply(mut self, origin: &str, destination: &str, reply: TrackerReply) -> Self {
        self.replies
            .insert(format!("{origin}-{destination}"), reply);
        self
    }
}

#[async_trait]
impl FareTracker for FakeTracker {
    async fn lowest_fare(&self, query: &FareQuery) -> Result<Option<TrackedFare>, PricingError> {
        let key = format!("{}-{}", query.origin, query.destination);
        match self.replies.get(&key) {
            Some(TrackerReply::Fare(price, insights)) => Ok(Some(TrackedFare {
                lowest_price: *price,
                insights: insights.clone(),
            })),
            Some(TrackerReply::Failure) => Err(vendor_down()),
            Some(TrackerReply::Nothing) | None => Ok(None),
        }
    }
}

#[derive(Default)]
pub(super) struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
        Err(MailError::Rejected {
            provider: "fake",
            status: 422,
            body: "invalid recipient".to_string(),
        })
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl AlertStore for UnavailableStore {
    async fn insert(&self, _alert: NewAlert) -> Result<Alert, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list(&self) -> Result<Vec<Alert>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn update_last_price(&self, _id: AlertId, _price: Decimal) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Lists the wrapped rows but refuses every write.
pub(super) struct ReadOnlyStore(pub InMemoryAlertStore);

#[async_trait]
impl AlertStore for ReadOnlyStore {
    async fn insert(&self, _alert: NewAlert) -> Result<Alert, StoreError> {
        Err(StoreError::Rejected {
            status: 403,
            message: "read only".to_string(),
        })
    }

    async fn list(&self) -> Result<Vec<Alert>, StoreError> {
        self.0.list().await
    }

    async fn update_last_price(&self, _id: AlertId, _price: Decimal) -> Result<(), StoreError> {
        Err(StoreError::Rejected {
            status: 403,
            message: "read only".to_string(),
        })
    }
}

#[derive(Default)]
pub(super) struct FakeDirectory {
    pub suggestions: Vec<AirportSuggestion>,
    pub fail: bool,
    pub keywords: Mutex<Vec<String>>,
}

#[async_trait]
impl AirportDirectory for FakeDirectory {
    async fn search(&self, keyword: &str) -> Result<Vec<AirportSuggestion>, PricingError> {
        self.keywords
            .lock()
            .expect("directory mutex poisoned")
            .push(keyword.to_string());
        if self.fail {
            return Err(vendor_down());
        }
        Ok(self.suggestions.clone())
    }
}

pub(super) fn build_service(
    store: Arc<dyn AlertStore>,
    quotes: Arc<FakeQuotes>,
    tracker: FakeTracker,
    mailer: Arc<dyn Mailer>,
) -> AlertService {
    AlertService::new(store, quotes, Arc::new(tracker), mailer, settings())
}

pub(super) fn router_with(service: AlertService, directory: Arc<FakeDirectory>) -> axum::Router {
    alert_router(AlertApi {
        alerts: Arc::new(service),
        airports: directory,
    })
}
