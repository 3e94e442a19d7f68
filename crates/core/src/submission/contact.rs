use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::lead::{ContactLead, CONTACT_FORM_SOURCE};
use crate::domain::quote::RequestStatus;
use crate::submission::message::contact_lead_notification;
use crate::submission::ports::{ContactLeadStore, Notifier};
use crate::submission::validation::validate_contact_message;
use crate::submission::SubmissionOutcome;

pub const INVALID_MESSAGE: &str = "Validation failed. Please check your inputs.";
pub const PERSISTENCE_FAILED_MESSAGE: &str = "Failed to save message. Please try again.";
pub const ACCEPTED_MESSAGE: &str = "Message received! We will get back to you shortly.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub email: String,
    pub message: String,
}

pub struct ContactPipeline {
    store: Arc<dyn ContactLeadStore>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
}

impl ContactPipeline {
    pub fn new(
        store: Arc<dyn ContactLeadStore>,
        notifier: Arc<dyn Notifier>,
        recipient: impl Into<String>,
    ) -> Self {
        Self { store, notifier, recipient: recipient.into() }
    }

    pub async fn submit(&self, submission: ContactSubmission) -> SubmissionOutcome {
        let (email, message) = match validate_contact_message(&submission.email, &submission.message)
        {
            Ok(valid) => valid,
            Err(errors) => {
                debug!(event_name = "contact.submission.rejected", "contact form failed validation");
                return SubmissionOutcome::invalid(errors, INVALID_MESSAGE);
            }
        };

        let lead = ContactLead {
            name: ContactLead::name_from_email(&email),
            email,
            phone: None,
            message,
            source: CONTACT_FORM_SOURCE.to_string(),
            status: RequestStatus::New,
            created_at: Utc::now(),
        };

        let lead_id = match self.store.insert_contact_lead(&lead).await {
            Ok(id) => id,
            Err(err) => {
                error!(
                    event_name = "contact.submission.persistence_failed",
                    error = %err,
                    "contact lead could not be saved"
                );
                return SubmissionOutcome::failed(PERSISTENCE_FAILED_MESSAGE);
            }
        };
        info!(event_name = "contact.submission.persisted", lead_id = %lead_id, "contact lead saved");

        if let Err(err) =
            self.notifier.send(&contact_lead_notification(&self.recipient, &lead)).await
        {
            warn!(
                event_name = "contact.submission.notification_failed",
                lead_id = %lead_id,
                error = %err,
                "operator notification failed; contact lead is saved"
            );
        }

        SubmissionOutcome::accepted(ACCEPTED_MESSAGE, Some(lead_id))
    }
}
