use sqlx::Row;

use sitequote_core::domain::lead::NewsletterSubscriber;
use sitequote_core::submission::{PersistenceError, SubscriberStore};

use super::{format_timestamp, new_record_id, RepositoryError};
use crate::DbPool;

pub struct SqlSubscriberRepository {
    pool: DbPool,
}

impl SqlSubscriberRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn is_active(&self, email: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM newsletter_subscriber
             WHERE email = ? AND is_active = 1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        Ok(count > 0)
    }

    /// Re-subscribing a previously deactivated address reactivates it.
    pub async fn upsert(&self, subscriber: &NewsletterSubscriber) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO newsletter_subscriber (id, email, is_active, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET is_active = excluded.is_active",
        )
        .bind(new_record_id())
        .bind(&subscriber.email)
        .bind(subscriber.is_active)
        .bind(format_timestamp(&subscriber.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl SubscriberStore for SqlSubscriberRepository {
    async fn is_subscribed(&self, email: &str) -> Result<bool, PersistenceError> {
        Ok(self.is_active(email).await?)
    }

    async fn subscribe(&self, subscriber: &NewsletterSubscriber) -> Result<(), PersistenceError> {
        Ok(self.upsert(subscriber).await?)
    }
}
