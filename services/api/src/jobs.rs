use crate::infra::{alert_api, amadeus_client};
use clap::Args;
use fare_watch::alerts::format_brl;
use fare_watch::config::AppConfig;
use fare_watch::error::AppError;
use fare_watch::pricing::{is_searchable, AirportDirectory, MIN_KEYWORD_LEN};
use fare_watch::telemetry;

#[derive(Args, Debug)]
pub(crate) struct AirportArgs {
    /// City name, accents allowed (e.g. "São Paulo")
    pub(crate) keyword: String,
}

/// One pass of the price check, for schedulers that run a command instead of
/// calling the HTTP trigger.
pub(crate) async fn run_price_check() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let api = alert_api(&config)?;
    let report = api.alerts.check_prices().await?;

    println!("{}", report.summary());
    for change in &report.changes {
        println!(
            "  alert {}: {} -> {}",
            change.id,
            format_brl(change.old),
            format_brl(change.new)
        );
    }
    for failure in &report.failures {
        println!("  alert {} not updated: {}", failure.id, failure.reason);
    }
    if report.skipped > 0 {
        println!("  {} alert(s) skipped without a current fare", report.skipped);
    }
    Ok(())
}

pub(crate) async fn run_airport_search(args: AirportArgs) -> Result<(), AppError> {
    if !is_searchable(&args.keyword) {
        println!("Keyword must have at least {MIN_KEYWORD_LEN} characters.");
        return Ok(());
    }

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let suggestions = amadeus_client(&config)?.search(&args.keyword).await?;
    if suggestions.is_empty() {
        println!("No airports found for '{}'.", args.keyword);
    }
    for suggestion in suggestions {
        println!("{}  {}", suggestion.iata_code, suggestion.name);
    }
    Ok(())
}
