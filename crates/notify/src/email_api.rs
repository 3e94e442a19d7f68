use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use sitequote_core::submission::{Notification, NotificationError, Notifier};

#[derive(Debug, Error)]
#[error("could not build email api client: {0}")]
pub struct NotifierBuildError(#[from] reqwest::Error);

/// Sends notifications through a Resend-compatible email HTTP API.
pub struct EmailApiNotifier {
    client: Client,
    api_url: String,
    api_key: SecretString,
    sender: String,
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl EmailApiNotifier {
    pub fn new(
        api_url: impl Into<String>,
        api_key: SecretString,
        sender: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, NotifierBuildError> {
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs.max(1))).build()?;
        Ok(Self { client, api_url: api_url.into(), api_key, sender: sender.into() })
    }
}

#[async_trait]
impl Notifier for EmailApiNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let payload = EmailPayload {
            from: &self.sender,
            to: [notification.recipient.as_str()],
            subject: &notification.subject,
            text: &notification.body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|error| NotificationError::new(format!("email api request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                event_name = "notify.email_api.rejected",
                status = %status,
                "email api returned a non-success status"
            );
            return Err(NotificationError::new(format!(
                "email api returned {status}: {}",
                body.trim()
            )));
        }

        tracing::debug!(
            event_name = "notify.email_api.accepted",
            status = %status,
            "email api accepted the message"
        );
        Ok(())
    }
}
