use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::http::{build_client, read_json};
use super::{FareQuery, FareTracker, PriceInsights, PricingError, TrackedFare};

const VENDOR: &str = "serpapi";

/// Google Flights results scraped through SerpApi, polled by the price check.
pub struct SerpApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    currency: String,
}

impl std::fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("base_url", &self.base_url)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl SerpApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            http: build_client(VENDOR)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            currency: currency.into(),
        })
    }

    fn search_params(&self, query: &FareQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", "google_flights".to_string()),
            ("api_key", self.api_key.clone()),
            ("departure_id", query.origin.clone()),
            ("arrival_id", query.destination.clone()),
            (
                "outbound_date",
                query.departure_date.format("%Y-%m-%d").to_string(),
            ),
            ("adults", query.passengers.to_string()),
            ("currency", self.currency.clone()),
            ("hl", "pt-br".to_string()),
            ("gl", "br".to_string()),
            // 1 restricts to nonstop flights, 0 allows any number of stops.
            ("stops", if query.nonstop { "1" } else { "0" }.to_string()),
            ("deep_search", "true".to_string()),
        ];

        match query.return_date {
            Some(date) => {
                params.push(("type", "1".to_string()));
                params.push(("return_date", date.format("%Y-%m-%d").to_string()));
            }
            None => params.push(("type", "2".to_string())),
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
struct GoogleFlightsResponse {
    #[serde(default)]
    best_flights: Vec<FlightResult>,
    #[serde(default)]
    other_flights: Vec<FlightResult>,
    #[serde(default)]
    price_insights: Option<PriceInsights>,
}

#[derive(Debug, Deserialize)]
struct FlightResult {
    /// Some itineraries are listed without a price.
    #[serde(default)]
    price: Option<Decimal>,
}

fn tracked_fare(response: GoogleFlightsResponse) -> Option<TrackedFare> {
    let lowest_price = response
        .best_flights
        .iter()
        .chain(response.other_flights.iter())
        .filter_map(|flight| flight.price)
        .min()?;

    Some(TrackedFare {
        lowest_price,
        insights: response.price_insights,
    })
}

#[async_trait]
impl FareTracker for SerpApiClient {
    async fn lowest_fare(&self, query: &FareQuery) -> Result<Option<TrackedFare>, PricingError> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&self.search_params(query))
            .send()
            .await
            .map_err(|source| PricingError::Transport {
                vendor: VENDOR,
                source,
            })?;

        let body: GoogleFlightsResponse = read_json(VENDOR, response).await?;
        Ok(tracked_fare(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn client() -> SerpApiClient {
        SerpApiClient::new("https://serpapi.com/", "secret", "BRL").expect("client builds")
    }

    fn query(return_date: Option<NaiveDate>, nonstop: bool) -> FareQuery {
        FareQuery {
            origin: "GRU".to_string(),
            destination: "REC".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
            return_date,
            passengers: 3,
            nonstop,
        }
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn one_way_nonstop_params() {
        let params = client().search_params(&query(None, true));
        assert_eq!(param(&params, "engine"), Some("google_flights"));
        assert_eq!(param(&params, "outbound_date"), Some("2026-12-18"));
        assert_eq!(param(&params, "adults"), Some("3"));
        assert_eq!(param(&params, "stops"), Some("1"));
        assert_eq!(param(&params, "type"), Some("2"));
        assert_eq!(param(&params, "return_date"), None);
    }

    #[test]
    fn round_trip_params_include_return_date() {
        let params = client().search_params(&query(NaiveDate::from_ymd_opt(2027, 1, 4), false));
        assert_eq!(param(&params, "stops"), Some("0"));
        assert_eq!(param(&params, "type"), Some("1"));
        assert_eq!(param(&params, "return_date"), Some("2027-01-04"));
    }

    #[test]
    fn lowest_price_spans_best_and_other_flights() {
        let response: GoogleFlightsResponse = serde_json::from_value(json!({
            "best_flights": [{ "price": 980 }, { "price": 1015 }],
            "other_flights": [{ "price": 912 }, { "type": "Round trip" }],
            "price_insights": { "lowest_price": 912, "price_level": "typical" }
        }))
        .expect("response parses");

        let fare = tracked_fare(response).expect("fare found");
        assert_eq!(fare.lowest_price, Decimal::new(912, 0));
        assert_eq!(
            fare.insights.and_then(|insights| insights.price_level),
            Some("typical".to_string())
        );
    }

    #[test]
    fn no_priced_flights_means_no_fare() {
        let response: GoogleFlightsResponse =
            serde_json::from_value(json!({ "other_flights": [{}] })).expect("response parses");
        assert!(tracked_fare(response).is_none());
        assert!(tracked_fare(GoogleFlightsResponse::default()).is_none());
    }
}
