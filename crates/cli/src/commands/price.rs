use std::sync::Arc;

use serde::Serialize;
use sitequote_core::domain::service::ServiceId;
use sitequote_core::pricing::{
    Currency, FormattedTotals, PricingPreferences, QuoteBuilder, Totals,
};

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct PriceReport {
    selected: Vec<ServiceId>,
    currency_code: String,
    include_tax: bool,
    totals: Totals,
    formatted: FormattedTotals,
}

/// Prices `ids` exactly as the calculator would. A selection without a base
/// package gets the catalog default.
pub fn run(ids: &[String], currency: Currency, include_tax: bool) -> CommandResult {
    let config = match load_config("price") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let catalog = match config.pricing.load_catalog() {
        Ok(catalog) => Arc::new(catalog),
        Err(error) => {
            return CommandResult::failure("price", "catalog_invalid", error.to_string(), 2)
        }
    };

    let builder = match QuoteBuilder::restore(
        catalog,
        config.pricing.rates(),
        ids.iter().map(|id| ServiceId::new(id.trim())),
        PricingPreferences { currency, include_tax },
    ) {
        Ok(builder) => builder,
        Err(error) => {
            return CommandResult::failure("price", "invalid_selection", error.to_string(), 2)
        }
    };

    let totals = builder.compute_totals();
    let formatted = totals.formatted(builder.currency_code());
    let message = format!(
        "{} upfront, {} monthly, ~{} days",
        formatted.one_time_total, formatted.recurring_total, totals.total_duration_days
    );

    CommandResult::success_with_data(
        "price",
        message,
        PriceReport {
            selected: builder.selected_items().iter().map(|item| item.id.clone()).collect(),
            currency_code: builder.currency_code().to_string(),
            include_tax,
            totals,
            formatted,
        },
    )
}
