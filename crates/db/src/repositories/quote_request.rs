use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::Row;

use sitequote_core::domain::quote::{
    QuoteDraft, QuoteRequest, QuoteRequestId, RequestStatus, SelectedItemSnapshot,
    StoredQuoteRequest, TotalsSnapshot,
};
use sitequote_core::pricing::Currency;
use sitequote_core::submission::{PersistenceError, QuoteRequestStore};

use super::{format_timestamp, new_record_id, parse_timestamp, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRequestRepository {
    pool: DbPool,
}

impl SqlQuoteRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, request: &QuoteRequest) -> Result<QuoteRequestId, RepositoryError> {
        let id = new_record_id();
        let items_json = serde_json::to_string(&request.draft.items)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let totals = &request.draft.totals;

        sqlx::query(
            "INSERT INTO quote_request (id, contact_name, contact_email, contact_phone,
                                        selected_items_json, total_one_time, total_recurring,
                                        currency, currency_code, include_tax, duration_days,
                                        status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.contact_name)
        .bind(&request.contact_email)
        .bind(&request.contact_phone)
        .bind(&items_json)
        .bind(totals.one_time.to_string())
        .bind(totals.recurring.to_string())
        .bind(totals.currency.as_str())
        .bind(&totals.currency_code)
        .bind(totals.include_tax)
        .bind(i64::from(totals.duration_days))
        .bind(request.status.as_str())
        .bind(format_timestamp(&request.created_at))
        .execute(&self.pool)
        .await?;

        Ok(QuoteRequestId(id))
    }

    pub async fn find_by_id(
        &self,
        id: &QuoteRequestId,
    ) -> Result<Option<StoredQuoteRequest>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, contact_name, contact_email, contact_phone, selected_items_json,
                    total_one_time, total_recurring, currency, currency_code, include_tax,
                    duration_days, status, created_at
             FROM quote_request WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_quote_request(r)?)),
            None => Ok(None),
        }
    }

    /// Newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<StoredQuoteRequest>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, contact_name, contact_email, contact_phone, selected_items_json,
                    total_one_time, total_recurring, currency, currency_code, include_tax,
                    duration_days, status, created_at
             FROM quote_request
             ORDER BY created_at DESC, id ASC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_quote_request).collect()
    }
}

#[async_trait::async_trait]
impl QuoteRequestStore for SqlQuoteRequestRepository {
    async fn insert_quote_request(
        &self,
        request: &QuoteRequest,
    ) -> Result<QuoteRequestId, PersistenceError> {
        Ok(self.insert(request).await?)
    }
}

fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn parse_decimal(column: &str, value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value)
        .map_err(|e| RepositoryError::Decode(format!("invalid {column} `{value}`: {e}")))
}

fn row_to_quote_request(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<StoredQuoteRequest, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_err)?;
    let contact_name: String = row.try_get("contact_name").map_err(decode_err)?;
    let contact_email: String = row.try_get("contact_email").map_err(decode_err)?;
    let contact_phone: Option<String> = row.try_get("contact_phone").map_err(decode_err)?;
    let items_json: String = row.try_get("selected_items_json").map_err(decode_err)?;
    let one_time: String = row.try_get("total_one_time").map_err(decode_err)?;
    let recurring: String = row.try_get("total_recurring").map_err(decode_err)?;
    let currency: String = row.try_get("currency").map_err(decode_err)?;
    let currency_code: String = row.try_get("currency_code").map_err(decode_err)?;
    let include_tax: bool = row.try_get("include_tax").map_err(decode_err)?;
    let duration_days: i64 = row.try_get("duration_days").map_err(decode_err)?;
    let status: String = row.try_get("status").map_err(decode_err)?;
    let created_at: String = row.try_get("created_at").map_err(decode_err)?;

    let items: Vec<SelectedItemSnapshot> =
        serde_json::from_str(&items_json).map_err(decode_err)?;
    let currency = Currency::from_str(&currency).map_err(RepositoryError::Decode)?;
    let status = RequestStatus::parse(&status)
        .ok_or_else(|| RepositoryError::Decode(format!("invalid request status: {status}")))?;
    let duration_days = u32::try_from(duration_days)
        .map_err(|_| RepositoryError::Decode(format!("invalid duration_days: {duration_days}")))?;

    Ok(StoredQuoteRequest {
        id: QuoteRequestId(id),
        request: QuoteRequest {
            contact_name,
            contact_email,
            contact_phone,
            draft: QuoteDraft {
                items,
                totals: TotalsSnapshot {
                    one_time: parse_decimal("total_one_time", &one_time)?,
                    recurring: parse_decimal("total_recurring", &recurring)?,
                    currency,
                    currency_code,
                    include_tax,
                    duration_days,
                },
            },
            status,
            created_at: parse_timestamp(&created_at)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use sitequote_core::domain::quote::{
        QuoteDraft, QuoteRequest, QuoteRequestId, RequestStatus, SelectedItemSnapshot,
        TotalsSnapshot,
    };
    use sitequote_core::domain::service::ServiceId;
    use sitequote_core::pricing::Currency;
    use sitequote_core::submission::QuoteRequestStore;

    use super::SqlQuoteRequestRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_request(name: &str, minutes_ago: i64) -> QuoteRequest {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp");
        QuoteRequest {
            contact_name: name.to_string(),
            contact_email: "ana@example.com".to_string(),
            contact_phone: None,
            draft: QuoteDraft {
                items: vec![
                    SelectedItemSnapshot {
                        id: ServiceId::new("corporate-website"),
                        title: "Corporate Website".to_string(),
                    },
                    SelectedItemSnapshot {
                        id: ServiceId::new("tech-support"),
                        title: "Technical Support".to_string(),
                    },
                ],
                totals: TotalsSnapshot {
                    one_time: Decimal::new(585_000, 2),
                    recurring: Decimal::new(46_800, 2),
                    currency: Currency::Local,
                    currency_code: "MDL".to_string(),
                    include_tax: true,
                    duration_days: 7,
                },
            },
            status: RequestStatus::New,
            created_at: base - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_id_preserves_snapshot() {
        let pool = setup().await;
        let repo = SqlQuoteRequestRepository::new(pool);
        let request = sample_request("Ana", 0);

        let id = repo.insert_quote_request(&request).await.expect("insert");
        let found = repo.find_by_id(&id).await.expect("find").expect("should exist");

        assert_eq!(found.id, id);
        assert_eq!(found.request, request);
        assert_eq!(found.request.draft.totals.one_time, Decimal::new(585_000, 2));
    }

    #[tokio::test]
    async fn each_insert_gets_a_distinct_id() {
        let pool = setup().await;
        let repo = SqlQuoteRequestRepository::new(pool);

        let first = repo.insert_quote_request(&sample_request("Ana", 0)).await.expect("insert 1");
        let second = repo.insert_quote_request(&sample_request("Ana", 0)).await.expect("insert 2");

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let pool = setup().await;
        let repo = SqlQuoteRequestRepository::new(pool);

        let found = repo.find_by_id(&QuoteRequestId("missing".to_string())).await.expect("find");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_recent_orders_newest_first_and_honours_limit() {
        let pool = setup().await;
        let repo = SqlQuoteRequestRepository::new(pool);

        repo.insert(&sample_request("Oldest", 30)).await.expect("insert oldest");
        repo.insert(&sample_request("Newest", 0)).await.expect("insert newest");
        repo.insert(&sample_request("Middle", 10)).await.expect("insert middle");

        let recent = repo.list_recent(2).await.expect("list");
        let names: Vec<&str> =
            recent.iter().map(|stored| stored.request.contact_name.as_str()).collect();

        assert_eq!(names, vec!["Newest", "Middle"]);
    }

    #[tokio::test]
    async fn closed_pool_surfaces_persistence_error() {
        let pool = setup().await;
        let repo = SqlQuoteRequestRepository::new(pool.clone());
        pool.close().await;

        let result = repo.insert_quote_request(&sample_request("Ana", 0)).await;

        assert!(result.is_err(), "insert on a closed pool should fail");
    }
}
