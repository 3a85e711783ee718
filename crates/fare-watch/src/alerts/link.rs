use chrono::NaiveDate;

const SKYSCANNER_FLIGHTS: &str = "https://www.skyscanner.com.br/transport/flights";

/// Deep link to the Skyscanner results page for the route, e.g.
/// `https://www.skyscanner.com.br/transport/flights/gru/rec/261218/270104/`.
pub fn purchase_link(
    origin: &str,
    destination: &str,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
) -> String {
    let mut link = format!(
        "{SKYSCANNER_FLIGHTS}/{}/{}/{}/",
        origin.to_ascii_lowercase(),
        destination.to_ascii_lowercase(),
        departure_date.format("%y%m%d")
    );
    if let Some(date) = return_date {
        link.push_str(&format!("{}/", date.format("%y%m%d")));
    }
    link
}
