pub mod builder;
pub mod catalog;
pub mod money;
pub mod totals;

pub use builder::{reduce, BuilderEvent, BuilderState, QuoteBuilder, Selection};
pub use catalog::{Catalog, CatalogError};
pub use money::{format_amount, Currency, PricingPreferences, PricingRates};
pub use totals::{compute_totals, FormattedTotals, Totals};
