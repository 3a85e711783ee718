//! Fare vendors: one-off quotes with market context, ongoing tracking for the
//! periodic check, and the airport lookup behind the form's autocomplete.

pub mod airports;
pub mod amadeus;
pub mod context;
mod http;
pub mod serpapi;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub use airports::{is_searchable, sanitize_keyword, AirportSuggestion, MIN_KEYWORD_LEN};
pub use amadeus::AmadeusClient;
pub use context::{PriceInsights, PriceLevel, PriceQuartiles};
pub use serpapi::SerpApiClient;

/// Itinerary being priced. `nonstop` restricts results to direct flights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
    pub nonstop: bool,
}

impl FareQuery {
    pub fn is_one_way(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Lowest fare reported by a tracker together with its market commentary.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFare {
    pub lowest_price: Decimal,
    pub insights: Option<PriceInsights>,
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("{vendor} request failed: {source}")]
    Transport {
        vendor: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{vendor} responded with status {status}: {body}")]
    Status {
        vendor: &'static str,
        status: u16,
        body: String,
    },
    #[error("{vendor} returned an unreadable payload: {detail}")]
    Payload { vendor: &'static str, detail: String },
}

/// Source of bookable offers, used to set an alert's baseline price.
#[async_trait]
pub trait FareQuoteSource: Send + Sync {
    /// Cheapest bookable total, or `None` when the vendor has no offer.
    async fn cheapest_offer(&self, query: &FareQuery) -> Result<Option<Decimal>, PricingError>;

    /// Historical quartiles for the route, when the vendor has enough data.
    async fn price_metrics(
        &self,
        query: &FareQuery,
    ) -> Result<Option<PriceQuartiles>, PricingError>;
}

/// Source polled by the periodic price check.
#[async_trait]
pub trait FareTracker: Send + Sync {
    async fn lowest_fare(&self, query: &FareQuery) -> Result<Option<TrackedFare>, PricingError>;
}

/// City/airport lookup backing the form's autocomplete.
#[async_trait]
pub trait AirportDirectory: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<Vec<AirportSuggestion>, PricingError>;
}
