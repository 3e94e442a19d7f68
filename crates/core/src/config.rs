use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::service::ServiceId;
use crate::pricing::catalog::{Catalog, CatalogError};
use crate::pricing::money::{PricingRates, MAX_EXCHANGE_RATE};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    pub notification: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub reference_currency: String,
    pub local_currency: String,
    pub exchange_rate: Decimal,
    pub tax_rate: Decimal,
    pub catalog_path: Option<PathBuf>,
    pub default_base_package: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NotificationConfig {
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub sender: String,
    pub recipient: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub notification_api_key: Option<String>,
    pub notification_recipient: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
    #[error("catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogError),
}

impl Default for AppConfig {
    fn default() -> Self {
        let rates = PricingRates::default();
        Self {
            database: DatabaseConfig {
                url: "sqlite://sitequote.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            pricing: PricingConfig {
                reference_currency: rates.reference_code,
                local_currency: rates.local_code,
                exchange_rate: rates.exchange_rate,
                tax_rate: rates.tax_rate,
                catalog_path: None,
                default_base_package: None,
            },
            notification: NotificationConfig {
                api_key: None,
                api_url: "https://api.resend.com/emails".to_string(),
                sender: "Sitequote <onboarding@resend.dev>".to_string(),
                recipient: "admin@example.com".to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl PricingConfig {
    pub fn rates(&self) -> PricingRates {
        PricingRates {
            reference_code: self.reference_currency.clone(),
            local_code: self.local_currency.clone(),
            exchange_rate: self.exchange_rate,
            tax_rate: self.tax_rate,
        }
    }

    /// Loads and validates the catalog once; callers share the result. The
    /// built-in catalog goes through the same validation as a file.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::standard(),
        };

        let default_base_package = match &self.default_base_package {
            Some(id) => ServiceId::new(id.as_str()),
            None => catalog.default_base_package().clone(),
        };
        Ok(Catalog::new(catalog.items().to_vec(), default_base_package)
            .map_err(CatalogError::from)?)
    }
}

impl NotificationConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("sitequote.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(reference_currency) = pricing.reference_currency {
                self.pricing.reference_currency = reference_currency;
            }
            if let Some(local_currency) = pricing.local_currency {
                self.pricing.local_currency = local_currency;
            }
            if let Some(exchange_rate) = pricing.exchange_rate {
                self.pricing.exchange_rate = exchange_rate;
            }
            if let Some(tax_rate) = pricing.tax_rate {
                self.pricing.tax_rate = tax_rate;
            }
            if let Some(catalog_path) = pricing.catalog_path {
                self.pricing.catalog_path = Some(catalog_path);
            }
            if let Some(default_base_package) = pricing.default_base_package {
                self.pricing.default_base_package = Some(default_base_package);
            }
        }

        if let Some(notification) = patch.notification {
            if let Some(api_key_value) = notification.api_key {
                self.notification.api_key = Some(secret_value(api_key_value));
            }
            if let Some(api_url) = notification.api_url {
                self.notification.api_url = api_url;
            }
            if let Some(sender) = notification.sender {
                self.notification.sender = sender;
            }
            if let Some(recipient) = notification.recipient {
                self.notification.recipient = recipient;
            }
            if let Some(timeout_secs) = notification.timeout_secs {
                self.notification.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SITEQUOTE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SITEQUOTE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("SITEQUOTE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SITEQUOTE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("SITEQUOTE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SITEQUOTE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SITEQUOTE_SERVER_PORT") {
            self.server.port = parse_env("SITEQUOTE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SITEQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("SITEQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("SITEQUOTE_PRICING_EXCHANGE_RATE") {
            self.pricing.exchange_rate = parse_env("SITEQUOTE_PRICING_EXCHANGE_RATE", &value)?;
        }
        if let Some(value) = read_env("SITEQUOTE_PRICING_TAX_RATE") {
            self.pricing.tax_rate = parse_env("SITEQUOTE_PRICING_TAX_RATE", &value)?;
        }
        if let Some(value) = read_env("SITEQUOTE_PRICING_CATALOG_PATH") {
            self.pricing.catalog_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("SITEQUOTE_NOTIFICATION_API_KEY") {
            self.notification.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SITEQUOTE_NOTIFICATION_API_URL") {
            self.notification.api_url = value;
        }
        if let Some(value) = read_env("SITEQUOTE_NOTIFICATION_SENDER") {
            self.notification.sender = value;
        }
        if let Some(value) = read_env("SITEQUOTE_NOTIFICATION_RECIPIENT") {
            self.notification.recipient = value;
        }

        let log_level =
            read_env("SITEQUOTE_LOGGING_LEVEL").or_else(|| read_env("SITEQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SITEQUOTE_LOGGING_FORMAT").or_else(|| read_env("SITEQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(catalog_path) = overrides.catalog_path {
            self.pricing.catalog_path = Some(catalog_path);
        }
        if let Some(api_key) = overrides.notification_api_key {
            self.notification.api_key = Some(secret_value(api_key));
        }
        if let Some(recipient) = overrides.notification_recipient {
            self.notification.recipient = recipient;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_pricing(&self.pricing)?;
        validate_notification(&self.notification)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("sitequote.toml"), PathBuf::from("config/sitequote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.reference_currency.trim().is_empty() || pricing.local_currency.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pricing.reference_currency and pricing.local_currency must not be empty".to_string(),
        ));
    }

    if pricing.exchange_rate <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.exchange_rate must be greater than zero".to_string(),
        ));
    }

    if pricing.exchange_rate > Decimal::from(MAX_EXCHANGE_RATE) {
        return Err(ConfigError::Validation(format!(
            "pricing.exchange_rate must not exceed {MAX_EXCHANGE_RATE}"
        )));
    }

    if pricing.tax_rate < Decimal::ZERO || pricing.tax_rate >= Decimal::ONE {
        return Err(ConfigError::Validation(
            "pricing.tax_rate must be a fraction in range 0..1 (e.g. 0.20 for 20%)".to_string(),
        ));
    }

    Ok(())
}

fn validate_notification(notification: &NotificationConfig) -> Result<(), ConfigError> {
    let api_url = notification.api_url.trim();
    if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "notification.api_url must start with http:// or https://".to_string(),
        ));
    }

    if notification.is_enabled() && !notification.recipient.contains('@') {
        return Err(ConfigError::Validation(
            "notification.recipient must be an email address when notification.api_key is set"
                .to_string(),
        ));
    }

    if notification.timeout_secs == 0 || notification.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "notification.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    pricing: Option<PricingPatch>,
    notification: Option<NotificationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    reference_currency: Option<String>,
    local_currency: Option<String>,
    exchange_rate: Option<Decimal>,
    tax_rate: Option<Decimal>,
    catalog_path: Option<PathBuf>,
    default_base_package: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationPatch {
    api_key: Option<String>,
    api_url: Option<String>,
    sender: Option<String>,
    recipient: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
