use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub vendors: VendorConfig,
    pub alerts: AlertSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mail_provider = match optional_var("MAIL_PROVIDER") {
            Some(raw) => Some(MailProvider::parse(&raw)?),
            None => None,
        };

        let vendors = VendorConfig {
            amadeus_base_url: optional_var("AMADEUS_BASE_URL")
                .unwrap_or_else(|| "https://test.api.amadeus.com".to_string()),
            amadeus_api_key: optional_var("AMADEUS_API_KEY"),
            amadeus_api_secret: optional_var("AMADEUS_API_SECRET"),
            serpapi_base_url: optional_var("SERPAPI_BASE_URL")
                .unwrap_or_else(|| "https://serpapi.com".to_string()),
            serpapi_key: optional_var("SERPAPI_KEY"),
            supabase_url: optional_var("SUPABASE_URL"),
            supabase_anon_key: optional_var("SUPABASE_ANON_KEY"),
            mail_provider,
            resend_api_key: optional_var("RESEND_API_KEY"),
            sendgrid_api_key: optional_var("SENDGRID_API_KEY"),
        };

        let alerts = AlertSettings {
            mail_from: optional_var("MAIL_FROM")
                .unwrap_or_else(|| "onboarding@resend.dev".to_string()),
            currency: optional_var("PRICE_CURRENCY").unwrap_or_else(|| "BRL".to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            vendors,
            alerts,
        })
    }
}

/// Blank values are treated the same as unset ones.
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output is only wanted on a developer terminal.
    pub ansi: bool,
}

/// Transactional mail vendors the service can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailProvider {
    Resend,
    SendGrid,
}

impl MailProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "sendgrid" => Ok(Self::SendGrid),
            _ => Err(ConfigError::UnknownMailProvider(value.to_string())),
        }
    }
}

/// Credentials and endpoints for the external collaborators.
#[derive(Debug, Clone, Default)]
pub struct VendorConfig {
    pub amadeus_base_url: String,
    pub amadeus_api_key: Option<String>,
    pub amadeus_api_secret: Option<String>,
    pub serpapi_base_url: String,
    pub serpapi_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub mail_provider: Option<MailProvider>,
    pub resend_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
}

/// Resolved credentials for a mail vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub provider: MailProvider,
    pub api_key: String,
}

impl VendorConfig {
    pub fn require_amadeus(&self) -> Result<(&str, &str), ConfigError> {
        let key = required(&self.amadeus_api_key, "AMADEUS_API_KEY")?;
        let secret = required(&self.amadeus_api_secret, "AMADEUS_API_SECRET")?;
        Ok((key, secret))
    }

    pub fn require_serpapi(&self) -> Result<&str, ConfigError> {
        required(&self.serpapi_key, "SERPAPI_KEY")
    }

    /// Returns `None` when no datastore is configured at all.
    pub fn supabase(&self) -> Result<Option<(&str, &str)>, ConfigError> {
        match &self.supabase_url {
            None => Ok(None),
            Some(url) => {
                let key = required(&self.supabase_anon_key, "SUPABASE_ANON_KEY")?;
                Ok(Some((url.as_str(), key)))
            }
        }
    }

    /// Picks the mail vendor. An explicit provider must have its key; otherwise
    /// Resend wins over SendGrid when both keys are present.
    pub fn mail(&self) -> Result<Option<MailCredentials>, ConfigError> {
        let credentials = match self.mail_provider {
            Some(MailProvider::Resend) => Some(MailCredentials {
                provider: MailProvider::Resend,
                api_key: required(&self.resend_api_key, "RESEND_API_KEY")?.to_string(),
            }),
            Some(MailProvider::SendGrid) => Some(MailCredentials {
                provider: MailProvider::SendGrid,
                api_key: required(&self.sendgrid_api_key, "SENDGRID_API_KEY")?.to_string(),
            }),
            None => {
                if let Some(key) = &self.resend_api_key {
                    Some(MailCredentials {
                        provider: MailProvider::Resend,
                        api_key: key.clone(),
                    })
                } else {
                    self.sendgrid_api_key
                        .as_ref()
                        .map(|key| MailCredentials {
                            provider: MailProvider::SendGrid,
                            api_key: key.clone(),
                        })
                }
            }
        };
        Ok(credentials)
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::MissingVar(name))
}

/// Alert content settings shared by the create and check flows.
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub mail_from: String,
    pub currency: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            mail_from: "onboarding@resend.dev".to_string(),
            currency: "BRL".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingVar(&'static str),
    UnknownMailProvider(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingVar(name) => write!(f, "{name} must be set"),
            ConfigError::UnknownMailProvider(value) => {
                write!(f, "MAIL_PROVIDER '{value}' is not one of resend, sendgrid")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::MissingVar(_)
            | ConfigError::UnknownMailProvider(_) => None,
        }
    }
}
