use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::pricing::FareQuery;

/// Most vendors cap a single search at nine seated travelers.
pub const MAX_PASSENGERS: u8 = 9;

/// Datastore row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub i64);

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored price alert, one row of the `alerts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub user_email: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub last_price: Decimal,
    pub purchase_link: String,
    #[serde(default)]
    pub short_duration: bool,
}

impl Alert {
    pub fn fare_query(&self) -> FareQuery {
        FareQuery {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            departure_date: self.departure_date,
            return_date: self.return_date,
            passengers: self.passengers,
            nonstop: self.short_duration,
        }
    }
}

/// Row payload written when an alert is first created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    pub user_email: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub last_price: Decimal,
    pub purchase_link: String,
    pub short_duration: bool,
}

impl NewAlert {
    pub fn from_draft(draft: AlertDraft, last_price: Decimal, purchase_link: String) -> Self {
        Self {
            user_email: draft.user_email,
            origin: draft.origin,
            destination: draft.destination,
            departure_date: draft.departure_date,
            return_date: draft.return_date,
            passengers: draft.passengers,
            last_price,
            purchase_link,
            short_duration: draft.short_duration,
        }
    }

    pub fn into_alert(self, id: AlertId) -> Alert {
        Alert {
            id,
            user_email: self.user_email,
            origin: self.origin,
            destination: self.destination,
            departure_date: self.departure_date,
            return_date: self.return_date,
            passengers: self.passengers,
            last_price: self.last_price,
            purchase_link: self.purchase_link,
            short_duration: self.short_duration,
        }
    }
}

/// Raw form submission. Every field is optional here so that missing input is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub departure_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub return_date: Option<String>,
    /// Signed so that out-of-range counts reach `validate`.
    #[serde(default)]
    pub passengers: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_email: Option<String>,
    #[serde(default)]
    pub short_duration: Option<bool>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// A validated request that has not been priced yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDraft {
    pub user_email: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
    pub short_duration: bool,
}

impl AlertDraft {
    pub fn fare_query(&self) -> FareQuery {
        FareQuery {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            departure_date: self.departure_date,
            return_date: self.return_date,
            passengers: self.passengers,
            nonstop: self.short_duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Dados incompletos.")]
    Incomplete,
    #[error("Dados inválidos.")]
    Malformed,
    #[error("código de aeroporto inválido: {0}")]
    InvalidAirport(String),
    #[error("origem e destino devem ser diferentes")]
    SameRoute,
    #[error("data inválida (use AAAA-MM-DD): {0}")]
    InvalidDate(String),
    #[error("a data de volta não pode ser anterior à data de ida")]
    ReturnBeforeDeparture,
    #[error("número de passageiros deve estar entre 1 e 9")]
    Passengers,
    #[error("e-mail inválido: {0}")]
    InvalidEmail(String),
}

impl AlertRequest {
    pub fn validate(self) -> Result<AlertDraft, ValidationError> {
        let (Some(origin), Some(destination), Some(departure), Some(user_email)) = (
            self.origin,
            self.destination,
            self.departure_date,
            self.user_email,
        ) else {
            return Err(ValidationError::Incomplete);
        };

        let origin = iata_code(&origin)?;
        let destination = iata_code(&destination)?;
        if origin == destination {
            return Err(ValidationError::SameRoute);
        }

        let departure_date = parse_date(&departure)?;
        let return_date = self.return_date.as_deref().map(parse_date).transpose()?;
        if matches!(return_date, Some(date) if date < departure_date) {
            return Err(ValidationError::ReturnBeforeDeparture);
        }

        let passengers = match self.passengers {
            None => 1,
            Some(count) => u8::try_from(count)
                .ok()
                .filter(|count| (1..=MAX_PASSENGERS).contains(count))
                .ok_or(ValidationError::Passengers)?,
        };

        if !is_plausible_email(&user_email) {
            return Err(ValidationError::InvalidEmail(user_email));
        }

        Ok(AlertDraft {
            user_email,
            origin,
            destination,
            departure_date,
            return_date,
            passengers,
            short_duration: self.short_duration.unwrap_or(false),
        })
    }
}

fn iata_code(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(ValidationError::InvalidAirport(raw.to_string()))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
