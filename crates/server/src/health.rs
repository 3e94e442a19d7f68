use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use sitequote_core::pricing::Catalog;
use sitequote_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    catalog: Arc<Catalog>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog: HealthCheck,
    pub database: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, catalog: Arc<Catalog>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, catalog })
}

/// The catalog is validated at startup, so only the database can degrade.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        catalog: HealthCheck {
            status: "ready",
            detail: format!(
                "{} items, default base package `{}`",
                state.catalog.items().len(),
                state.catalog.default_base_package()
            ),
        },
        database,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quote_request").fetch_one(pool).await
    {
        Ok(count) => HealthCheck { status: "ready", detail: format!("{count} quote requests stored") },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}
