use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceId;
use crate::pricing::money::Currency;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteRequestId(pub String);

impl fmt::Display for QuoteRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Follow-up state of a captured lead. Captures always start at `New`; the
/// back office moves them along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Selected line item as it looked at submission time. The id stays stable
/// when catalog titles are edited later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItemSnapshot {
    pub id: ServiceId,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsSnapshot {
    pub one_time: Decimal,
    pub recurring: Decimal,
    pub currency: Currency,
    pub currency_code: String,
    pub include_tax: bool,
    pub duration_days: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub items: Vec<SelectedItemSnapshot>,
    pub totals: TotalsSnapshot,
}

impl QuoteDraft {
    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.title.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub draft: QuoteDraft,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// A quote request as read back from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuoteRequest {
    pub id: QuoteRequestId,
    pub request: QuoteRequest,
}
