use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Minor-unit digits used when an amount is rendered for display.
pub const DISPLAY_SCALE: u32 = 2;

/// Upper bound for `exchange_rate`. Together with the catalog price bound it
/// keeps every converted, taxed total far inside `Decimal` range.
pub const MAX_EXCHANGE_RATE: i64 = 1_000_000;

/// Display currency. Catalog prices are always authored in `Reference`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    #[default]
    Reference,
    Local,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Local => "local",
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "local" => Ok(Self::Local),
            other => Err(format!("unsupported currency `{other}` (expected reference|local)")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPreferences {
    pub currency: Currency,
    pub include_tax: bool,
}

/// Fixed conversion and tax constants applied by the derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRates {
    pub reference_code: String,
    pub local_code: String,
    /// Units of local currency per one unit of reference currency.
    pub exchange_rate: Decimal,
    pub tax_rate: Decimal,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            reference_code: "EUR".to_string(),
            local_code: "MDL".to_string(),
            exchange_rate: Decimal::new(195, 1),
            tax_rate: Decimal::new(20, 2),
        }
    }
}

impl PricingRates {
    pub fn code(&self, currency: Currency) -> &str {
        match currency {
            Currency::Reference => &self.reference_code,
            Currency::Local => &self.local_code,
        }
    }

    pub fn convert(&self, amount: Decimal, currency: Currency) -> Decimal {
        match currency {
            Currency::Reference => amount,
            Currency::Local => amount * self.exchange_rate,
        }
    }
}

pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn format_amount(amount: Decimal, code: &str) -> String {
    let mut rounded = round_for_display(amount);
    rounded.rescale(DISPLAY_SCALE);
    format!("{rounded} {code}")
}
