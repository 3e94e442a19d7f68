use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::quote::{QuoteDraft, QuoteRequest, RequestStatus};
use crate::submission::message::quote_request_notification;
use crate::submission::ports::{Notifier, QuoteRequestStore};
use crate::submission::validation::validate_contact_details;
use crate::submission::SubmissionOutcome;

pub const INVALID_MESSAGE: &str = "Please fill in all required fields correctly.";
pub const PERSISTENCE_FAILED_MESSAGE: &str = "Failed to save quote request. Please try again.";
pub const ACCEPTED_MESSAGE: &str =
    "Quote request submitted successfully! We will contact you soon.";

/// Raw contact input plus the builder snapshot taken when the user hit submit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub draft: QuoteDraft,
}

pub struct QuoteSubmissionPipeline {
    store: Arc<dyn QuoteRequestStore>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
}

impl QuoteSubmissionPipeline {
    pub fn new(
        store: Arc<dyn QuoteRequestStore>,
        notifier: Arc<dyn Notifier>,
        recipient: impl Into<String>,
    ) -> Self {
        Self { store, notifier, recipient: recipient.into() }
    }

    pub async fn submit(&self, submission: QuoteSubmission) -> SubmissionOutcome {
        let contact = match validate_contact_details(
            &submission.name,
            &submission.email,
            submission.phone.as_deref(),
        ) {
            Ok(contact) => contact,
            Err(errors) => {
                debug!(
                    event_name = "quote.submission.rejected",
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "quote submission failed validation"
                );
                return SubmissionOutcome::invalid(errors, INVALID_MESSAGE);
            }
        };

        let request = QuoteRequest {
            contact_name: contact.name,
            contact_email: contact.email,
            contact_phone: contact.phone,
            draft: submission.draft,
            status: RequestStatus::New,
            created_at: Utc::now(),
        };

        let request_id = match self.store.insert_quote_request(&request).await {
            Ok(id) => id,
            Err(err) => {
                error!(
                    event_name = "quote.submission.persistence_failed",
                    error = %err,
                    "quote request could not be saved"
                );
                return SubmissionOutcome::failed(PERSISTENCE_FAILED_MESSAGE);
            }
        };
        info!(
            event_name = "quote.submission.persisted",
            quote_request_id = %request_id,
            item_count = request.draft.items.len(),
            "quote request saved"
        );

        let notification = quote_request_notification(&self.recipient, &request);
        match self.notifier.send(&notification).await {
            Ok(()) => info!(
                event_name = "quote.submission.notified",
                quote_request_id = %request_id,
                "operator notified of quote request"
            ),
            Err(err) => warn!(
                event_name = "quote.submission.notification_failed",
                quote_request_id = %request_id,
                error = %err,
                "operator notification failed; quote request is saved"
            ),
        }

        SubmissionOutcome::accepted(ACCEPTED_MESSAGE, Some(request_id.0))
    }
}
