//! Amadeus self-service API client.
//!
//! Used for the baseline quote when an alert is created, the quartile metrics
//! that put that quote in context, and the city search behind the airport
//! autocomplete. Authentication is the OAuth2 client-credentials grant; the
//! bearer token is cached until shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::airports::{sanitize_keyword, suggestions_from, AirportSuggestion, CitySearchResponse};
use super::http::{build_client, read_json};
use super::{AirportDirectory, FareQuery, FareQuoteSource, PriceQuartiles, PricingError};

const VENDOR: &str = "amadeus";
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);
const CITY_SEARCH_COUNTRY: &str = "BR";

pub struct AmadeusClient {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    currency: String,
    token: Mutex<Option<AccessToken>>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: u64,
}

impl std::fmt::Debug for AmadeusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusClient")
            .field("base_url", &self.base_url)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl AmadeusClient {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            http: build_client(VENDOR)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            currency: currency.into(),
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, PricingError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        debug!("requesting amadeus access token");
        let response = self
            .http
            .post(format!("{}/v1/security/oauth2/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let grant: TokenGrant = read_json(VENDOR, response).await?;

        let lifetime = Duration::from_secs(grant.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(AccessToken {
            value: grant.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(grant.access_token)
    }

    /// Sends an authorized request. A 401 drops the cached token so the next
    /// call authenticates again.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PricingError> {
        let token = self.access_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(transport)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
        }
        read_json(VENDOR, response).await
    }
}

fn transport(source: reqwest::Error) -> PricingError {
    PricingError::Transport {
        vendor: VENDOR,
        source,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlightOffersRequest<'a> {
    currency_code: &'a str,
    origin_destinations: Vec<OriginDestination<'a>>,
    travelers: Vec<Traveler>,
    sources: [&'static str; 1],
    search_criteria: SearchCriteria,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OriginDestination<'a> {
    id: &'static str,
    origin_location_code: &'a str,
    destination_location_code: &'a str,
    departure_date_time_range: DateRange,
}

#[derive(Debug, Serialize)]
struct DateRange {
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Traveler {
    id: String,
    traveler_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchCriteria {
    max_flight_offers: u8,
    flight_filters: FlightFilters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlightFilters {
    connection_restriction: ConnectionRestriction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionRestriction {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_number_of_connections: Option<u8>,
}

fn flight_offers_request<'a>(query: &'a FareQuery, currency: &'a str) -> FlightOffersRequest<'a> {
    let mut origin_destinations = vec![OriginDestination {
        id: "1",
        origin_location_code: &query.origin,
        destination_location_code: &query.destination,
        departure_date_time_range: DateRange {
            date: query.departure_date,
        },
    }];
    if let Some(date) = query.return_date {
        origin_destinations.push(OriginDestination {
            id: "2",
            origin_location_code: &query.destination,
            destination_location_code: &query.origin,
            departure_date_time_range: DateRange { date },
        });
    }

    FlightOffersRequest {
        currency_code: currency,
        origin_destinations,
        travelers: (1..=query.passengers)
            .map(|n| Traveler {
                id: n.to_string(),
                traveler_type: "ADULT",
            })
            .collect(),
        sources: ["GDS"],
        search_criteria: SearchCriteria {
            max_flight_offers: 1,
            flight_filters: FlightFilters {
                connection_restriction: ConnectionRestriction {
                    max_number_of_connections: query.nonstop.then_some(0),
                },
            },
        },
    }
}

#[derive(Debug, Deserialize)]
struct FlightOffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
struct FlightOffer {
    price: OfferPrice,
}

#[derive(Debug, Deserialize)]
struct OfferPrice {
    total: Decimal,
}

#[derive(Debug, Deserialize)]
struct PriceMetricsResponse {
    #[serde(default)]
    data: Vec<ItineraryMetrics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItineraryMetrics {
    #[serde(default)]
    price_metrics: Vec<PriceMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceMetric {
    quartile_ranking: String,
    amount: Decimal,
}

fn quartiles_from(response: PriceMetricsResponse) -> Option<PriceQuartiles> {
    let metrics = response.data.into_iter().next()?.price_metrics;
    let amount = |ranking: &str| {
        metrics
            .iter()
            .find(|metric| metric.quartile_ranking.eq_ignore_ascii_case(ranking))
            .map(|metric| metric.amount)
    };
    Some(PriceQuartiles {
        first: amount("FIRST")?,
        third: amount("THIRD")?,
    })
}

#[async_trait]
impl FareQuoteSource for AmadeusClient {
    async fn cheapest_offer(&self, query: &FareQuery) -> Result<Option<Decimal>, PricingError> {
        let body = flight_offers_request(query, &self.currency);
        let request = self
            .http
            .post(format!("{}/v2/shopping/flight-offers", self.base_url))
            .json(&body);
        let response: FlightOffersResponse = self.send_json(request).await?;

        Ok(response
            .data
            .into_iter()
            .map(|offer| offer.price.total)
            .min())
    }

    async fn price_metrics(
        &self,
        query: &FareQuery,
    ) -> Result<Option<PriceQuartiles>, PricingError> {
        let departure = query.departure_date.format("%Y-%m-%d").to_string();
        let one_way = query.is_one_way().to_string();
        let request = self
            .http
            .get(format!(
                "{}/v1/analytics/itinerary-price-metrics",
                self.base_url
            ))
            .query(&[
                ("originIataCode", query.origin.as_str()),
                ("destinationIataCode", query.destination.as_str()),
                ("departureDate", departure.as_str()),
                ("currencyCode", self.currency.as_str()),
                ("oneWay", one_way.as_str()),
            ]);
        let response: PriceMetricsResponse = self.send_json(request).await?;
        Ok(quartiles_from(response))
    }
}

#[async_trait]
impl AirportDirectory for AmadeusClient {
    async fn search(&self, keyword: &str) -> Result<Vec<AirportSuggestion>, PricingError> {
        let keyword = sanitize_keyword(keyword);
        let request = self
            .http
            .get(format!(
                "{}/v1/reference-data/locations/cities",
                self.base_url
            ))
            .query(&[
                ("keyword", keyword.as_str()),
                ("countryCode", CITY_SEARCH_COUNTRY),
                ("include", "AIRPORTS"),
            ]);
        let response: CitySearchResponse = self.send_json(request).await?;
        Ok(suggestions_from(response))
    }
}
