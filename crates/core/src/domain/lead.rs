use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::quote::RequestStatus;

pub const CONTACT_FORM_SOURCE: &str = "contact_form";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub source: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactLead {
    /// The contact form only asks for an email, so the lead is named after
    /// the address' local part.
    pub fn name_from_email(email: &str) -> String {
        email.split('@').next().unwrap_or(email).to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubscriber {
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
