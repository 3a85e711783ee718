use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::domain::{Alert, AlertRequest, ValidationError};
use super::service::{AlertService, AlertServiceError, CheckReport};
use crate::pricing::{is_searchable, AirportDirectory, AirportSuggestion, PriceLevel};

/// Shared state for the alert endpoints.
#[derive(Clone)]
pub struct AlertApi {
    pub alerts: Arc<AlertService>,
    pub airports: Arc<dyn AirportDirectory>,
}

/// Router builder exposing the endpoints the alert form and the cron trigger call.
pub fn alert_router(api: AlertApi) -> Router {
    Router::new()
        .route("/api/create-alert", post(create_alert_handler))
        .route("/api/check-prices", get(check_prices_handler))
        .route("/api/search-airports", get(search_airports_handler))
        .with_state(api)
}

impl IntoResponse for AlertServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            AlertServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            AlertServiceError::NoOffers => StatusCode::NOT_FOUND,
            AlertServiceError::Pricing(_) | AlertServiceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!(error = %self, "alert request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct CreateAlertResponse {
    pub message: &'static str,
    pub data: Vec<Alert>,
    #[serde(rename = "priceLevel", skip_serializing_if = "Option::is_none")]
    pub price_level: Option<PriceLevel>,
}

/// Unreadable bodies answer 400 with a JSON error, like any other validation failure.
pub(crate) async fn create_alert_handler(
    State(api): State<AlertApi>,
    payload: Result<Json<AlertRequest>, JsonRejection>,
) -> Result<Json<CreateAlertResponse>, AlertServiceError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "alert request body rejected");
        AlertServiceError::Validation(ValidationError::Malformed)
    })?;
    let created = api.alerts.create(request).await?;
    let message = if created.confirmation_sent {
        "Alerta criado com sucesso! Enviamos um e-mail de confirmação."
    } else {
        "Alerta criado com sucesso!"
    };

    Ok(Json(CreateAlertResponse {
        message,
        data: vec![created.alert],
        price_level: created.price_level,
    }))
}

#[derive(Debug, Serialize)]
pub struct CheckPricesResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: CheckReport,
}

pub(crate) async fn check_prices_handler(
    State(api): State<AlertApi>,
) -> Result<Json<CheckPricesResponse>, AlertServiceError> {
    let report = api.alerts.check_prices().await?;
    Ok(Json(CheckPricesResponse {
        message: report.summary(),
        report,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirportSearchParams {
    #[serde(default)]
    keyword: Option<String>,
}

pub(crate) async fn search_airports_handler(
    State(api): State<AlertApi>,
    Query(params): Query<AirportSearchParams>,
) -> Response {
    let keyword = match params.keyword {
        Some(keyword) if is_searchable(&keyword) => keyword,
        _ => return Json(Vec::<AirportSuggestion>::new()).into_response(),
    };

    match api.airports.search(&keyword).await {
        Ok(suggestions) => Json(suggestions).into_response(),
        Err(err) => {
            error!(%keyword, error = %err, "airport search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Erro ao buscar dados." })),
            )
                .into_response()
        }
    }
}
