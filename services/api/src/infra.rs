use fare_watch::alerts::{AlertApi, AlertService, AlertStore};
use fare_watch::config::{AppConfig, ConfigError, MailProvider};
use fare_watch::error::AppError;
use fare_watch::mail::{LogMailer, Mailer, ResendMailer, SendGridMailer};
use fare_watch::pricing::{AmadeusClient, SerpApiClient};
use fare_watch::store::{InMemoryAlertStore, SupabaseAlertStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Hosted table when configured; otherwise a process-local store, which is
/// refused in production.
pub(crate) fn alert_store(config: &AppConfig) -> Result<Arc<dyn AlertStore>, AppError> {
    match config.vendors.supabase()? {
        Some((url, key)) => Ok(Arc::new(SupabaseAlertStore::new(url, key)?)),
        None if config.environment.is_production() => {
            Err(ConfigError::MissingVar("SUPABASE_URL").into())
        }
        None => {
            warn!("SUPABASE_URL not set, alerts are kept in memory");
            Ok(Arc::new(InMemoryAlertStore::default()))
        }
    }
}

pub(crate) fn mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, AppError> {
    match config.vendors.mail()? {
        Some(credentials) => {
            let transport: Arc<dyn Mailer> = match credentials.provider {
                MailProvider::Resend => Arc::new(ResendMailer::new(credentials.api_key)?),
                MailProvider::SendGrid => Arc::new(SendGridMailer::new(credentials.api_key)?),
            };
            Ok(transport)
        }
        None if config.environment.is_production() => {
            Err(ConfigError::MissingVar("RESEND_API_KEY").into())
        }
        None => {
            warn!("no mail provider configured, emails are logged instead of sent");
            Ok(Arc::new(LogMailer))
        }
    }
}

pub(crate) fn amadeus_client(config: &AppConfig) -> Result<AmadeusClient, AppError> {
    let (key, secret) = config.vendors.require_amadeus()?;
    Ok(AmadeusClient::new(
        config.vendors.amadeus_base_url.as_str(),
        key,
        secret,
        config.alerts.currency.as_str(),
    )?)
}

/// Builds the alert service and airport directory from configuration.
pub(crate) fn alert_api(config: &AppConfig) -> Result<AlertApi, AppError> {
    let amadeus = Arc::new(amadeus_client(config)?);
    let serpapi = SerpApiClient::new(
        config.vendors.serpapi_base_url.as_str(),
        config.vendors.require_serpapi()?,
        config.alerts.currency.as_str(),
    )?;

    let service = AlertService::new(
        alert_store(config)?,
        amadeus.clone(),
        Arc::new(serpapi),
        mailer(config)?,
        config.alerts.clone(),
    );

    Ok(AlertApi {
        alerts: Arc::new(service),
        airports: amadeus,
    })
}
