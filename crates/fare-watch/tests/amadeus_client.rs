use chrono::NaiveDate;
use fare_watch::pricing::{
    AirportDirectory, AmadeusClient, FareQuery, FareQuoteSource, PriceQuartiles, PricingError,
};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query(return_date: Option<NaiveDate>) -> FareQuery {
    FareQuery {
        origin: "GRU".to_string(),
        destination: "REC".to_string(),
        departure_date: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
        return_date,
        passengers: 2,
        nonstop: true,
    }
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    mount_token_expiring_in(server, 1799, expected_calls).await;
}

async fn mount_token_expiring_in(server: &MockServer, expires_in: u64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/security/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "amadeusOAuth2Token",
            "access_token": "token-1",
            "expires_in": expires_in
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> AmadeusClient {
    AmadeusClient::new(server.uri(), "key", "secret", "BRL").expect("client builds")
}

#[tokio::test]
async fn token_expiring_within_margin_is_requested_again() {
    let server = MockServer::start().await;
    mount_token_expiring_in(&server, 10, 2).await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "price": { "currency": "BRL", "total": "980.00" } }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let amadeus = client(&server);
    for _ in 0..2 {
        let price = amadeus
            .cheapest_offer(&query(None))
            .await
            .expect("offer request succeeds");
        assert_eq!(price, Some(Decimal::new(980, 0)));
    }
}

#[tokio::test]
async fn cheapest_offer_reuses_cached_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .and(header("authorization", "Bearer token-1"))
        .and(body_partial_json(json!({
            "currencyCode": "BRL",
            "originDestinations": [
                { "id": "1", "originLocationCode": "GRU", "destinationLocationCode": "REC",
                  "departureDateTimeRange": { "date": "2026-12-18" } },
                { "id": "2", "originLocationCode": "REC", "destinationLocationCode": "GRU",
                  "departureDateTimeRange": { "date": "2027-01-04" } }
            ],
            "searchCriteria": {
                "maxFlightOffers": 1,
                "flightFilters": { "connectionRestriction": { "maxNumberOfConnections": 0 } }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "price": { "currency": "BRL", "total": "1845.32" } },
                { "price": { "currency": "BRL", "total": "1702.10" } }
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let amadeus = client(&server);
    let round_trip = query(NaiveDate::from_ymd_opt(2027, 1, 4));

    for _ in 0..2 {
        let price = amadeus
            .cheapest_offer(&round_trip)
            .await
            .expect("offer request succeeds");
        assert_eq!(price, Some(Decimal::new(170210, 2)));
    }
}

#[tokio::test]
async fn empty_offer_list_means_no_price() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let price = client(&server)
        .cheapest_offer(&query(None))
        .await
        .expect("offer request succeeds");
    assert_eq!(price, None);
}

#[tokio::test]
async fn unauthorized_response_forces_new_token() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{ "code": 38190, "title": "Invalid access token" }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let amadeus = client(&server);
    for _ in 0..2 {
        match amadeus.cheapest_offer(&query(None)).await {
            Err(PricingError::Status { status: 401, .. }) => {}
            other => panic!("expected unauthorized status, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn price_metrics_reads_first_and_third_quartiles() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/analytics/itinerary-price-metrics"))
        .and(query_param("originIataCode", "GRU"))
        .and(query_param("destinationIataCode", "REC"))
        .and(query_param("departureDate", "2026-12-18"))
        .and(query_param("currencyCode", "BRL"))
        .and(query_param("oneWay", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "priceMetrics": [
                    { "amount": "612.00", "quartileRanking": "MINIMUM" },
                    { "amount": "804.50", "quartileRanking": "FIRST" },
                    { "amount": "955.00", "quartileRanking": "MEDIUM" },
                    { "amount": "1210.00", "quartileRanking": "THIRD" },
                    { "amount": "2003.00", "quartileRanking": "MAXIMUM" }
                ]
            }]
        })))
        .mount(&server)
        .await;

    let quartiles = client(&server)
        .price_metrics(&query(None))
        .await
        .expect("metrics request succeeds");
    assert_eq!(
        quartiles,
        Some(PriceQuartiles {
            first: Decimal::new(8045, 1),
            third: Decimal::new(1210, 0),
        })
    );
}

#[tokio::test]
async fn city_search_strips_accents_and_lists_airports() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations/cities"))
        .and(query_param("keyword", "Sao Paulo"))
        .and(query_param("countryCode", "BR"))
        .and(query_param("include", "AIRPORTS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "location",
                "subType": "city",
                "name": "SAO PAULO",
                "iataCode": "SAO",
                "relationships": [
                    { "id": "GRU", "type": "Airport" },
                    { "id": "CGH", "type": "Airport" }
                ]
            }],
            "included": {
                "airports": {
                    "GRU": { "iataCode": "GRU", "name": "GUARULHOS INTL" },
                    "CGH": { "iataCode": "CGH", "name": "CONGONHAS" }
                }
            }
        })))
        .mount(&server)
        .await;

    let suggestions = client(&server)
        .search("São Paulo")
        .await
        .expect("search succeeds");
    let codes: Vec<&str> = suggestions
        .iter()
        .map(|suggestion| suggestion.iata_code.as_str())
        .collect();
    assert_eq!(codes, ["GRU", "CGH"]);
    assert!(suggestions[0].name.ends_with("(GRU)"));
}

#[tokio::test]
async fn vendor_errors_surface_with_status() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations/cities"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    match client(&server).search("Recife").await {
        Err(PricingError::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected vendor status error, got {other:?}"),
    }
}
