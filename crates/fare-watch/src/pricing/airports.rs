use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Shorter keywords are answered with an empty list without calling the vendor.
pub const MIN_KEYWORD_LEN: usize = 3;

/// Entry shown in the autocomplete dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportSuggestion {
    pub name: String,
    pub iata_code: String,
}

/// Strips accents (`São Paulo` becomes `Sao Paulo`); the city search only
/// matches unaccented keywords.
pub fn sanitize_keyword(keyword: &str) -> String {
    keyword
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

pub fn is_searchable(keyword: &str) -> bool {
    keyword.trim().chars().count() >= MIN_KEYWORD_LEN
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CitySearchResponse {
    #[serde(default)]
    data: Vec<City>,
    #[serde(default)]
    included: Option<Included>,
}

#[derive(Debug, Deserialize)]
struct City {
    name: String,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Included {
    #[serde(default)]
    airports: HashMap<String, AirportRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirportRecord {
    iata_code: String,
    name: String,
}

/// Resolves each city's `Airport` relationships against the included airports,
/// keeping the vendor's city order.
pub(crate) fn suggestions_from(response: CitySearchResponse) -> Vec<AirportSuggestion> {
    let included = response.included.unwrap_or_default();
    let airports = &included.airports;

    response
        .data
        .iter()
        .flat_map(|city| {
            city.relationships
                .iter()
                .filter(|relation| relation.kind == "Airport")
                .filter_map(move |relation| airports.get(&relation.id))
                .map(move |airport| AirportSuggestion {
                    name: format!(
                        "{}, {} ({})",
                        city.name.to_lowercase(),
                        airport.name.to_lowercase(),
                        airport.iata_code
                    ),
                    iata_code: airport.iata_code.clone(),
                })
        })
        .collect()
}
