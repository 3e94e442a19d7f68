//! Lead capture: validate user input, persist it, then tell an operator.
//!
//! Every pipeline follows the same ordering. Validation failures short-circuit
//! before any I/O. A persistence failure ends the run and is surfaced to the
//! caller for a manual retry. Notification happens only after a successful
//! write and its failure is logged, never returned.

pub mod contact;
pub mod message;
pub mod newsletter;
pub mod ports;
pub mod quote;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use contact::{ContactPipeline, ContactSubmission};
pub use newsletter::{NewsletterPipeline, NewsletterSubmission};
pub use ports::{
    ContactLeadStore, Notification, NotificationError, Notifier, PersistenceError,
    QuoteRequestStore, SubscriberStore,
};
pub use quote::{QuoteSubmission, QuoteSubmissionPipeline};
pub use validation::FieldErrors;

/// Result handed back to the form that submitted the data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl SubmissionOutcome {
    pub fn accepted(message: impl Into<String>, record_id: Option<String>) -> Self {
        Self { success: true, errors: None, message: message.into(), record_id }
    }

    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self { success: false, errors: Some(errors), message: message.into(), record_id: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, errors: None, message: message.into(), record_id: None }
    }

    pub fn is_validation_failure(&self) -> bool {
        !self.success && self.errors.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldErrors, SubmissionOutcome};

    #[test]
    fn success_payload_omits_errors() {
        let payload =
            serde_json::to_value(SubmissionOutcome::accepted("saved", None)).expect("serialize");

        assert_eq!(payload["success"], true);
        assert!(payload.get("errors").is_none());
        assert!(payload.get("record_id").is_none());
    }

    #[test]
    fn validation_payload_is_keyed_by_field() {
        let mut errors = FieldErrors::default();
        errors.add("email", "Invalid email address");

        let outcome = SubmissionOutcome::invalid(errors, "check the form");
        let payload = serde_json::to_value(&outcome).expect("serialize");

        assert!(outcome.is_validation_failure());
        assert_eq!(payload["success"], false);
        assert_eq!(payload["errors"]["email"][0], "Invalid email address");
    }
}
