use std::time::Duration;

use sitequote_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

/// Pragmas are applied to every pooled connection, not just the first one.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use sitequote_core::config::AppConfig;

    use super::connect;

    #[tokio::test]
    async fn connect_uses_database_section_of_config() {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 2;

        let pool = connect(&config.database).await.expect("connect");
        let foreign_keys: i64 =
            sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");

        assert_eq!(foreign_keys, 1);
        pool.close().await;
    }
}
