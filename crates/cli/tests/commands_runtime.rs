use std::env;
use std::sync::{Mutex, OnceLock};

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use sitequote_cli::commands::{catalog, config, migrate, price, requests};
use sitequote_core::domain::quote::{
    QuoteDraft, QuoteRequest, RequestStatus, SelectedItemSnapshot, TotalsSnapshot,
};
use sitequote_core::domain::service::ServiceId;
use sitequote_core::pricing::Currency;
use sitequote_db::{connect_with_settings, SqlQuoteRequestRepository};
use tempfile::TempDir;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("SITEQUOTE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("SITEQUOTE_DATABASE_URL", "postgres://localhost/sitequote")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn catalog_lists_standard_items() {
    with_env(&[], || {
        let result = catalog::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let items = payload["data"].as_array().expect("catalog entries");
        assert_eq!(items.len(), 8);
        assert_eq!(items[0]["id"], "landing-page");
        assert_eq!(items[0]["price_one_time"], "150.00 EUR");
        assert!(payload["message"].as_str().unwrap_or_default().contains("landing-page"));
    });
}

#[test]
fn price_renders_local_currency_with_vat() {
    with_env(&[], || {
        let ids = vec!["corporate-website".to_string(), "tech-support".to_string()];
        let result = price::run(&ids, Currency::Local, true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["formatted"]["one_time_total"], "5850.00 MDL");
        assert_eq!(payload["data"]["formatted"]["recurring_total"], "468.00 MDL");
        assert_eq!(payload["data"]["selected"], serde_json::json!(["corporate-website", "tech-support"]));
    });
}

#[test]
fn price_adds_default_base_package_when_missing() {
    with_env(&[], || {
        let result = price::run(&["google-maps".to_string()], Currency::Reference, false);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["selected"], serde_json::json!(["landing-page", "google-maps"]));
        assert_eq!(payload["data"]["formatted"]["one_time_total"], "190.00 EUR");
    });
}

#[test]
fn price_rejects_unknown_item() {
    with_env(&[], || {
        let result = price::run(&["seo-audit".to_string()], Currency::Reference, false);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_selection");
        assert!(payload["message"].as_str().unwrap_or_default().contains("seo-audit"));
    });
}

#[test]
fn requests_fails_with_query_error_before_migration() {
    with_env(&[("SITEQUOTE_DATABASE_URL", "sqlite::memory:")], || {
        let result = requests::run(5);
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "query");
    });
}

#[test]
fn requests_lists_saved_quote_requests_after_migration() {
    let dir = TempDir::new().expect("temp dir");
    let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("sitequote.db").display());

    with_env(&[("SITEQUOTE_DATABASE_URL", database_url.as_str())], || {
        let migrated = migrate::run();
        assert_eq!(migrated.exit_code, 0, "migrate should succeed: {}", migrated.output);

        seed_quote_request(&database_url);

        let result = requests::run(5);
        assert_eq!(result.exit_code, 0, "requests should succeed: {}", result.output);

        let payload = parse_payload(&result.output);
        let rows = payload["data"].as_array().expect("request summaries");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Ana Popescu");
        assert_eq!(rows[0]["services"], serde_json::json!(["Landing Page"]));
        assert_eq!(rows[0]["total_one_time"], "150.00 EUR");
        assert_eq!(rows[0]["status"], "new");
    });
}

#[test]
fn config_reports_env_source_and_redacts_api_key() {
    with_env(
        &[
            ("SITEQUOTE_DATABASE_URL", "sqlite://env.db"),
            ("SITEQUOTE_NOTIFICATION_API_KEY", "re_live_secret_value"),
            ("SITEQUOTE_NOTIFICATION_RECIPIENT", "sales@example.com"),
        ],
        || {
            let output = config::run();

            assert!(output
                .contains("- database.url = sqlite://env.db (source: env (SITEQUOTE_DATABASE_URL))"));
            assert!(output.contains("- notification.api_key = re_***"));
            assert!(!output.contains("re_live_secret_value"));
            assert!(output.contains("- pricing.exchange_rate = 19.5 (source: default)"));
        },
    );
}

fn seed_quote_request(database_url: &str) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    runtime.block_on(async {
        let pool = connect_with_settings(database_url, 1, 5).await.expect("connect");
        let repository = SqlQuoteRequestRepository::new(pool.clone());
        repository
            .insert(&QuoteRequest {
                contact_name: "Ana Popescu".to_string(),
                contact_email: "ana@example.com".to_string(),
                contact_phone: None,
                draft: QuoteDraft {
                    items: vec![SelectedItemSnapshot {
                        id: ServiceId::new("landing-page"),
                        title: "Landing Page".to_string(),
                    }],
                    totals: TotalsSnapshot {
                        one_time: Decimal::new(150, 0),
                        recurring: Decimal::ZERO,
                        currency: Currency::Reference,
                        currency_code: "EUR".to_string(),
                        include_tax: false,
                        duration_days: 3,
                    },
                },
                status: RequestStatus::New,
                created_at: Utc::now(),
            })
            .await
            .expect("insert quote request");
        pool.close().await;
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SITEQUOTE_DATABASE_URL",
        "SITEQUOTE_DATABASE_MAX_CONNECTIONS",
        "SITEQUOTE_DATABASE_TIMEOUT_SECS",
        "SITEQUOTE_SERVER_BIND_ADDRESS",
        "SITEQUOTE_SERVER_PORT",
        "SITEQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SITEQUOTE_PRICING_EXCHANGE_RATE",
        "SITEQUOTE_PRICING_TAX_RATE",
        "SITEQUOTE_PRICING_CATALOG_PATH",
        "SITEQUOTE_NOTIFICATION_API_KEY",
        "SITEQUOTE_NOTIFICATION_API_URL",
        "SITEQUOTE_NOTIFICATION_SENDER",
        "SITEQUOTE_NOTIFICATION_RECIPIENT",
        "SITEQUOTE_LOGGING_LEVEL",
        "SITEQUOTE_LOGGING_FORMAT",
        "SITEQUOTE_LOG_LEVEL",
        "SITEQUOTE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
