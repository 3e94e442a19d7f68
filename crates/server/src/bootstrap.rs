use std::sync::Arc;

use sitequote_core::config::{AppConfig, ConfigError, LoadOptions};
use sitequote_core::submission::{ContactPipeline, NewsletterPipeline, QuoteSubmissionPipeline};
use sitequote_db::{
    connect, migrations, DbPool, SqlContactLeadRepository,
    SqlQuoteRequestRepository, SqlSubscriberRepository,
};
use sitequote_notify::{notifier_from_config, NotifierBuildError};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub api_state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Notifier(#[from] NotifierBuildError),
}

#[cfg(test)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Arc::new(config.pricing.load_catalog()?);
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        item_count = catalog.items().len(),
        default_base_package = %catalog.default_base_package(),
        "service catalog validated"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let notifier = notifier_from_config(&config.notification)?;
    let recipient = config.notification.recipient.clone();

    let api_state = ApiState {
        catalog,
        rates: config.pricing.rates(),
        quotes: Arc::new(QuoteSubmissionPipeline::new(
            Arc::new(SqlQuoteRequestRepository::new(db_pool.clone())),
            Arc::clone(&notifier),
            recipient.clone(),
        )),
        contacts: Arc::new(ContactPipeline::new(
            Arc::new(SqlContactLeadRepository::new(db_pool.clone())),
            notifier,
            recipient,
        )),
        newsletter: Arc::new(NewsletterPipeline::new(Arc::new(SqlSubscriberRepository::new(
            db_pool.clone(),
        )))),
    };

    Ok(Application { config, db_pool, api_state })
}
