use serde::Serialize;
use sitequote_core::pricing::format_amount;
use sitequote_db::{connect, SqlQuoteRequestRepository};

use crate::commands::{current_thread_runtime, load_config, CommandResult};

#[derive(Debug, Serialize)]
struct RequestSummary {
    id: String,
    created_at: String,
    status: &'static str,
    name: String,
    email: String,
    phone: Option<String>,
    services: Vec<String>,
    total_one_time: String,
    total_recurring: String,
    include_tax: bool,
}

pub fn run(limit: u32) -> CommandResult {
    let config = match load_config("requests") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match current_thread_runtime("requests") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let repository = SqlQuoteRequestRepository::new(pool.clone());
        let stored = repository
            .list_recent(limit)
            .await
            .map_err(|error| ("query", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(stored)
    });

    let stored = match result {
        Ok(stored) => stored,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("requests", error_class, message, exit_code)
        }
    };

    let summaries: Vec<RequestSummary> = stored
        .into_iter()
        .map(|stored| {
            let request = stored.request;
            let totals = &request.draft.totals;
            RequestSummary {
                id: stored.id.0,
                created_at: request.created_at.to_rfc3339(),
                status: request.status.as_str(),
                services: request.draft.titles().into_iter().map(str::to_string).collect(),
                total_one_time: format_amount(totals.one_time, &totals.currency_code),
                total_recurring: format_amount(totals.recurring, &totals.currency_code),
                include_tax: totals.include_tax,
                name: request.contact_name,
                email: request.contact_email,
                phone: request.contact_phone,
            }
        })
        .collect();

    CommandResult::success_with_data(
        "requests",
        format!("{} quote request(s)", summaries.len()),
        summaries,
    )
}
