use serde::Serialize;
use sitequote_core::domain::service::ServiceCategory;
use sitequote_core::pricing::format_amount;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct CatalogEntry {
    id: String,
    category: ServiceCategory,
    title: String,
    price_one_time: String,
    price_recurring: Option<String>,
    duration_days: u32,
}

pub fn run() -> CommandResult {
    let config = match load_config("catalog") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let catalog = match config.pricing.load_catalog() {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure("catalog", "catalog_invalid", error.to_string(), 2)
        }
    };

    let code = config.pricing.reference_currency.as_str();
    let entries: Vec<CatalogEntry> = ServiceCategory::ALL
        .into_iter()
        .flat_map(|category| catalog.items_by_category(category))
        .map(|item| CatalogEntry {
            id: item.id.to_string(),
            category: item.category,
            title: item.title.clone(),
            price_one_time: format_amount(item.price_one_time, code),
            price_recurring: item.price_recurring.map(|price| format_amount(price, code)),
            duration_days: item.duration_days,
        })
        .collect();

    CommandResult::success_with_data(
        "catalog",
        format!(
            "{} catalog items; default base package `{}`",
            entries.len(),
            catalog.default_base_package()
        ),
        entries,
    )
}
