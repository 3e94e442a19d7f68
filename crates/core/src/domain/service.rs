use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub String);

impl ServiceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Closed set of catalog categories. Only `BasePackage` is single-choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    BasePackage,
    Technical,
    AddOn,
    Support,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 4] =
        [Self::BasePackage, Self::Technical, Self::AddOn, Self::Support];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasePackage => "BASE_PACKAGE",
            Self::Technical => "TECHNICAL",
            Self::AddOn => "ADD_ON",
            Self::Support => "SUPPORT",
        }
    }

    pub fn is_single_choice(self) -> bool {
        matches!(self, Self::BasePackage)
    }
}

/// A purchasable line item. Prices are authored in the reference currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLineItem {
    pub id: ServiceId,
    pub category: ServiceCategory,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub price_one_time: Decimal,
    #[serde(default)]
    pub price_recurring: Option<Decimal>,
    #[serde(default)]
    pub duration_days: u32,
}

impl ServiceLineItem {
    pub fn is_recurring(&self) -> bool {
        self.price_recurring.is_some()
    }

    pub fn is_priced(&self) -> bool {
        self.price_one_time > Decimal::ZERO || self.price_recurring.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ServiceCategory, ServiceId, ServiceLineItem};

    #[test]
    fn category_serializes_in_screaming_snake_case() {
        let encoded = serde_json::to_string(&ServiceCategory::BasePackage).expect("serialize");
        assert_eq!(encoded, "\"BASE_PACKAGE\"");

        let decoded: ServiceCategory = serde_json::from_str("\"ADD_ON\"").expect("deserialize");
        assert_eq!(decoded, ServiceCategory::AddOn);
        assert_eq!(decoded.as_str(), "ADD_ON");
    }

    #[test]
    fn recurring_only_item_counts_as_priced() {
        let item = ServiceLineItem {
            id: ServiceId::new("tech-support"),
            category: ServiceCategory::Support,
            title: "Technical Support".to_string(),
            description: String::new(),
            price_one_time: Decimal::ZERO,
            price_recurring: Some(Decimal::new(20, 0)),
            duration_days: 0,
        };

        assert!(item.is_recurring());
        assert!(item.is_priced());
    }
}
