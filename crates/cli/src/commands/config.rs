use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use sitequote_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct Field<'a> {
    key_path: &'a str,
    env_key: Option<&'a str>,
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field<'static>> {
    let api_key = config
        .notification
        .api_key
        .as_ref()
        .map(|key| redact_key(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let catalog_path = config
        .pricing
        .catalog_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in>".to_string());

    vec![
        field("database.url", Some("SITEQUOTE_DATABASE_URL"), config.database.url.clone()),
        field(
            "database.max_connections",
            Some("SITEQUOTE_DATABASE_MAX_CONNECTIONS"),
            config.database.max_connections.to_string(),
        ),
        field(
            "database.timeout_secs",
            Some("SITEQUOTE_DATABASE_TIMEOUT_SECS"),
            config.database.timeout_secs.to_string(),
        ),
        field(
            "server.bind_address",
            Some("SITEQUOTE_SERVER_BIND_ADDRESS"),
            config.server.bind_address.clone(),
        ),
        field("server.port", Some("SITEQUOTE_SERVER_PORT"), config.server.port.to_string()),
        field(
            "server.graceful_shutdown_secs",
            Some("SITEQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS"),
            config.server.graceful_shutdown_secs.to_string(),
        ),
        field("pricing.reference_currency", None, config.pricing.reference_currency.clone()),
        field("pricing.local_currency", None, config.pricing.local_currency.clone()),
        field(
            "pricing.exchange_rate",
            Some("SITEQUOTE_PRICING_EXCHANGE_RATE"),
            config.pricing.exchange_rate.to_string(),
        ),
        field(
            "pricing.tax_rate",
            Some("SITEQUOTE_PRICING_TAX_RATE"),
            config.pricing.tax_rate.to_string(),
        ),
        field("pricing.catalog_path", Some("SITEQUOTE_PRICING_CATALOG_PATH"), catalog_path),
        field(
            "pricing.default_base_package",
            None,
            config
                .pricing
                .default_base_package
                .clone()
                .unwrap_or_else(|| "<catalog default>".to_string()),
        ),
        field("notification.api_key", Some("SITEQUOTE_NOTIFICATION_API_KEY"), api_key),
        field(
            "notification.api_url",
            Some("SITEQUOTE_NOTIFICATION_API_URL"),
            config.notification.api_url.clone(),
        ),
        field(
            "notification.sender",
            Some("SITEQUOTE_NOTIFICATION_SENDER"),
            config.notification.sender.clone(),
        ),
        field(
            "notification.recipient",
            Some("SITEQUOTE_NOTIFICATION_RECIPIENT"),
            config.notification.recipient.clone(),
        ),
        field(
            "notification.timeout_secs",
            None,
            config.notification.timeout_secs.to_string(),
        ),
        field("logging.level", Some("SITEQUOTE_LOGGING_LEVEL"), config.logging.level.clone()),
        field(
            "logging.format",
            Some("SITEQUOTE_LOGGING_FORMAT"),
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn field(key_path: &'static str, env_key: Option<&'static str>, value: String) -> Field<'static> {
    Field { key_path, env_key, value }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var(env_key).is_ok_and(|value| !value.trim().is_empty()) {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a short provider prefix such as `re_` so operators can tell keys apart.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('_') {
        if prefix.len() <= 4 {
            return format!("{prefix}_***");
        }
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use super::redact_key;

    #[test]
    fn redaction_keeps_only_short_prefix() {
        assert_eq!(redact_key("re_123456789"), "re_***");
        assert_eq!(redact_key("supersecretvalue"), "<redacted>");
        assert_eq!(redact_key("  "), "<empty>");
    }
}
