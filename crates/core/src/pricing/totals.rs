use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::builder::Selection;
use crate::pricing::catalog::Catalog;
use crate::pricing::money::{format_amount, PricingPreferences, PricingRates};

/// Derived amounts, expressed in the active display currency at full precision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub one_time_subtotal: Decimal,
    pub recurring_subtotal: Decimal,
    pub one_time_tax: Decimal,
    pub recurring_tax: Decimal,
    pub one_time_total: Decimal,
    pub recurring_total: Decimal,
    pub total_duration_days: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTotals {
    pub one_time_subtotal: String,
    pub recurring_subtotal: String,
    pub one_time_tax: String,
    pub recurring_tax: String,
    pub one_time_total: String,
    pub recurring_total: String,
}

impl Totals {
    pub fn formatted(&self, code: &str) -> FormattedTotals {
        FormattedTotals {
            one_time_subtotal: format_amount(self.one_time_subtotal, code),
            recurring_subtotal: format_amount(self.recurring_subtotal, code),
            one_time_tax: format_amount(self.one_time_tax, code),
            recurring_tax: format_amount(self.recurring_tax, code),
            one_time_total: format_amount(self.one_time_total, code),
            recurring_total: format_amount(self.recurring_total, code),
        }
    }
}

/// Recomputes every total from scratch; nothing is cached between calls.
pub fn compute_totals(
    catalog: &Catalog,
    selection: &Selection,
    preferences: &PricingPreferences,
    rates: &PricingRates,
) -> Totals {
    let mut one_time_subtotal = Decimal::ZERO;
    let mut recurring_subtotal = Decimal::ZERO;
    let mut total_duration_days = 0u32;

    for item in catalog.items().iter().filter(|item| selection.contains(&item.id)) {
        one_time_subtotal += rates.convert(item.price_one_time, preferences.currency);
        if let Some(recurring) = item.price_recurring {
            recurring_subtotal += rates.convert(recurring, preferences.currency);
        }
        total_duration_days = total_duration_days.saturating_add(item.duration_days);
    }

    let (one_time_tax, recurring_tax) = if preferences.include_tax {
        (one_time_subtotal * rates.tax_rate, recurring_subtotal * rates.tax_rate)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    Totals {
        one_time_subtotal,
        recurring_subtotal,
        one_time_tax,
        recurring_tax,
        one_time_total: one_time_subtotal + one_time_tax,
        recurring_total: recurring_subtotal + recurring_tax,
        total_duration_days,
    }
}
