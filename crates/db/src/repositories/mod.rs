use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use sitequote_core::submission::PersistenceError;

pub mod lead;
pub mod memory;
pub mod newsletter;
pub mod quote_request;

pub use lead::SqlContactLeadRepository;
pub use memory::{
    InMemoryContactLeadRepository, InMemoryQuoteRequestRepository, InMemorySubscriberRepository,
};
pub use newsletter::SqlSubscriberRepository;
pub use quote_request::SqlQuoteRequestRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for PersistenceError {
    fn from(value: RepositoryError) -> Self {
        PersistenceError::new(value.to_string())
    }
}

pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp `{value}`: {e}")))
}
