use sqlx::Row;

use sitequote_core::domain::lead::ContactLead;
use sitequote_core::domain::quote::RequestStatus;
use sitequote_core::submission::{ContactLeadStore, PersistenceError};

use super::{format_timestamp, new_record_id, parse_timestamp, RepositoryError};
use crate::DbPool;

pub struct SqlContactLeadRepository {
    pool: DbPool,
}

impl SqlContactLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, lead: &ContactLead) -> Result<String, RepositoryError> {
        let id = new_record_id();

        sqlx::query(
            "INSERT INTO contact_lead (id, name, email, phone, message, source, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.message)
        .bind(&lead.source)
        .bind(lead.status.as_str())
        .bind(format_timestamp(&lead.created_at))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ContactLead>, RepositoryError> {
        let row = sqlx::query(
            "SELECT name, email, phone, message, source, status, created_at
             FROM contact_lead WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_lead(r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl ContactLeadStore for SqlContactLeadRepository {
    async fn insert_contact_lead(&self, lead: &ContactLead) -> Result<String, PersistenceError> {
        Ok(self.insert(lead).await?)
    }
}

fn row_to_lead(row: &sqlx::sqlite::SqliteRow) -> Result<ContactLead, RepositoryError> {
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String = row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let phone: Option<String> =
        row.try_get("phone").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let message: String =
        row.try_get("message").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let source: String =
        row.try_get("source").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let status = RequestStatus::parse(&status_str)
        .ok_or_else(|| RepositoryError::Decode(format!("invalid lead status: {status_str}")))?;

    Ok(ContactLead {
        name,
        email,
        phone,
        message,
        source,
        status,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use sitequote_core::domain::lead::{ContactLead, CONTACT_FORM_SOURCE};
    use sitequote_core::domain::quote::RequestStatus;
    use sitequote_core::submission::ContactLeadStore;

    use super::SqlContactLeadRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let pool = setup().await;
        let repo = SqlContactLeadRepository::new(pool);
        let lead = ContactLead {
            name: "ion".to_string(),
            email: "ion@example.md".to_string(),
            phone: None,
            message: "Need a shop".to_string(),
            source: CONTACT_FORM_SOURCE.to_string(),
            status: RequestStatus::New,
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).single().expect("timestamp"),
        };

        let id = repo.insert_contact_lead(&lead).await.expect("insert");
        let found = repo.find_by_id(&id).await.expect("find").expect("should exist");

        assert_eq!(found, lead);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let pool = setup().await;
        let repo = SqlContactLeadRepository::new(pool);

        assert!(repo.find_by_id("missing").await.expect("find").is_none());
    }
}
