use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::lead::NewsletterSubscriber;
use crate::submission::ports::SubscriberStore;
use crate::submission::validation::validate_subscriber_email;
use crate::submission::SubmissionOutcome;

pub const INVALID_MESSAGE: &str = "Invalid email.";
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "You are already subscribed!";
pub const PERSISTENCE_FAILED_MESSAGE: &str = "Failed to subscribe. Please try again.";
pub const ACCEPTED_MESSAGE: &str = "Successfully subscribed to our newsletter!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubmission {
    pub email: String,
}

/// Newsletter signup. Unlike quotes and contact leads, no operator is notified.
pub struct NewsletterPipeline {
    store: Arc<dyn SubscriberStore>,
}

impl NewsletterPipeline {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, submission: NewsletterSubmission) -> SubmissionOutcome {
        let email = match validate_subscriber_email(&submission.email) {
            Ok(email) => email,
            Err(errors) => return SubmissionOutcome::invalid(errors, INVALID_MESSAGE),
        };

        match self.store.is_subscribed(&email).await {
            Ok(true) => return SubmissionOutcome::accepted(ALREADY_SUBSCRIBED_MESSAGE, None),
            Ok(false) => {}
            Err(err) => {
                error!(
                    event_name = "newsletter.lookup_failed",
                    error = %err,
                    "subscriber lookup failed"
                );
                return SubmissionOutcome::failed(PERSISTENCE_FAILED_MESSAGE);
            }
        }

        let subscriber = NewsletterSubscriber { email, is_active: true, created_at: Utc::now() };
        if let Err(err) = self.store.subscribe(&subscriber).await {
            error!(
                event_name = "newsletter.persistence_failed",
                error = %err,
                "subscriber could not be saved"
            );
            return SubmissionOutcome::failed(PERSISTENCE_FAILED_MESSAGE);
        }

        info!(event_name = "newsletter.subscribed", "newsletter subscriber saved");
        SubmissionOutcome::accepted(ACCEPTED_MESSAGE, None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        NewsletterPipeline, NewsletterSubmission, ACCEPTED_MESSAGE, ALREADY_SUBSCRIBED_MESSAGE,
    };
    use crate::submission::quote::test_support::RecordingStore;

    fn signup(email: &str) -> NewsletterSubmission {
        NewsletterSubmission { email: email.to_string() }
    }

    #[tokio::test]
    async fn second_signup_is_acknowledged_without_a_write() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = NewsletterPipeline::new(store.clone());

        let first = pipeline.submit(signup("reader@example.com")).await;
        let second = pipeline.submit(signup("Reader@Example.com")).await;

        assert_eq!(first.message, ACCEPTED_MESSAGE);
        assert!(second.success);
        assert_eq!(second.message, ALREADY_SUBSCRIBED_MESSAGE);
        assert_eq!(store.subscribers.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let pipeline = NewsletterPipeline::new(Arc::new(RecordingStore::failing()));

        let outcome = pipeline.submit(signup("reader@example.com")).await;

        assert!(!outcome.success);
        assert!(outcome.errors.is_none());
    }

    #[tokio::test]
    async fn malformed_email_is_a_field_error() {
        let outcome = NewsletterPipeline::new(Arc::new(RecordingStore::default()))
            .submit(signup("reader"))
            .await;

        assert!(outcome.is_validation_failure());
    }
}
