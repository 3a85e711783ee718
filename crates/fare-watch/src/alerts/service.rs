use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{Alert, AlertId, AlertRequest, NewAlert, ValidationError};
use super::link::purchase_link;
use super::notify;
use super::repository::{AlertStore, StoreError};
use crate::config::AlertSettings;
use crate::mail::Mailer;
use crate::pricing::{
    FareQuery, FareQuoteSource, FareTracker, PriceInsights, PriceLevel, PriceQuartiles,
    PricingError,
};

/// Service composing the datastore, the two fare vendors, and the mail transport.
pub struct AlertService {
    store: Arc<dyn AlertStore>,
    quotes: Arc<dyn FareQuoteSource>,
    tracker: Arc<dyn FareTracker>,
    mailer: Arc<dyn Mailer>,
    settings: AlertSettings,
}

/// Result of a successful `create`.
#[derive(Debug, Clone)]
pub struct CreatedAlert {
    pub alert: Alert,
    pub price_level: Option<PriceLevel>,
    pub confirmation_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChange {
    pub id: AlertId,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub old: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub new: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub id: AlertId,
    pub reason: String,
}

/// Outcome of one pass over every stored alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub checked: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub changes: Vec<PriceChange>,
    pub failures: Vec<CheckFailure>,
}

impl CheckReport {
    pub fn summary(&self) -> String {
        if self.checked == 0 {
            "Nenhum alerta para verificar.".to_string()
        } else {
            format!(
                "Verificação concluída. {} preços alterados.",
                self.changes.len()
            )
        }
    }
}

impl AlertService {
    pub fn new(
        store: Arc<dyn AlertStore>,
        quotes: Arc<dyn FareQuoteSource>,
        tracker: Arc<dyn FareTracker>,
        mailer: Arc<dyn Mailer>,
        settings: AlertSettings,
    ) -> Self {
        Self {
            store,
            quotes,
            tracker,
            mailer,
            settings,
        }
    }

    /// Prices the requested itinerary, stores the alert with that baseline, and
    /// sends the confirmation email. A failed confirmation does not undo the alert.
    pub async fn create(&self, request: AlertRequest) -> Result<CreatedAlert, AlertServiceError> {
        let draft = request.validate()?;
        let query = draft.fare_query();

        let baseline = self
            .quotes
            .cheapest_offer(&query)
            .await?
            .ok_or(AlertServiceError::NoOffers)?;
        info!(
            origin = %query.origin,
            destination = %query.destination,
            %baseline,
            "baseline fare found"
        );

        let quartiles = self.quartiles(&query).await;
        let link = purchase_link(
            &draft.origin,
            &draft.destination,
            draft.departure_date,
            draft.return_date,
        );
        let alert = self
            .store
            .insert(NewAlert::from_draft(draft, baseline, link))
            .await?;

        let context = quartiles.map(|q| q.describe(baseline));
        let message =
            notify::confirmation_email(&self.settings.mail_from, &alert, context.as_deref());
        let confirmation_sent = match self.mailer.send(&message).await {
            Ok(()) => true,
            Err(err) => {
                warn!(alert_id = %alert.id, error = %err, "confirmation email failed");
                false
            }
        };

        Ok(CreatedAlert {
            price_level: quartiles.map(|q| q.classify(baseline)),
            alert,
            confirmation_sent,
        })
    }

    async fn quartiles(&self, query: &FareQuery) -> Option<PriceQuartiles> {
        match self.quotes.price_metrics(query).await {
            Ok(quartiles) => quartiles,
            Err(err) => {
                warn!(error = %err, "price metrics unavailable");
                None
            }
        }
    }

    /// Re-prices every alert in sequence. The stored price is overwritten only
    /// after the change email is accepted by the mail transport.
    pub async fn check_prices(&self) -> Result<CheckReport, AlertServiceError> {
        let alerts = self.store.list().await?;
        let mut report = CheckReport::default();

        if alerts.is_empty() {
            info!("no alerts to check");
            return Ok(report);
        }

        info!(count = alerts.len(), "checking alert prices");
        for alert in alerts {
            report.checked += 1;
            let fare = match self.tracker.lowest_fare(&alert.fare_query()).await {
                Ok(Some(fare)) => fare,
                Ok(None) => {
                    info!(alert_id = %alert.id, "no current fare found, skipping");
                    report.skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(alert_id = %alert.id, error = %err, "fare lookup failed, skipping");
                    report.skipped += 1;
                    continue;
                }
            };

            let new_price = fare.lowest_price;
            if new_price == alert.last_price {
                info!(alert_id = %alert.id, price = %new_price, "price unchanged");
                report.unchanged += 1;
                continue;
            }

            info!(
                alert_id = %alert.id,
                old_price = %alert.last_price,
                %new_price,
                "price change detected"
            );
            let context = fare.insights.as_ref().and_then(PriceInsights::describe);
            let message = notify::price_change_email(
                &self.settings.mail_from,
                &alert,
                new_price,
                context.as_deref(),
            );

            if let Err(err) = self.mailer.send(&message).await {
                warn!(
                    alert_id = %alert.id,
                    to = %alert.user_email,
                    error = %err,
                    "price change email failed"
                );
                report.failures.push(CheckFailure {
                    id: alert.id,
                    reason: err.to_string(),
                });
                continue;
            }

            if let Err(err) = self.store.update_last_price(alert.id, new_price).await {
                error!(alert_id = %alert.id, error = %err, "could not persist new price");
                report.failures.push(CheckFailure {
                    id: alert.id,
                    reason: err.to_string(),
                });
                continue;
            }

            report.changes.push(PriceChange {
                id: alert.id,
                old: alert.last_price,
                new: new_price,
            });
        }

        info!(
            checked = report.checked,
            changed = report.changes.len(),
            failed = report.failures.len(),
            "price check finished"
        );
        Ok(report)
    }
}

/// Error raised by the alert service.
#[derive(Debug, thiserror::Error)]
pub enum AlertServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Nenhum voo encontrado para esta rota e data.")]
    NoOffers,
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
