use async_trait::async_trait;

use sitequote_core::submission::{Notification, NotificationError, Notifier};

/// Stand-in used when no email API key is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        tracing::warn!(
            event_name = "notify.skipped",
            subject = %notification.subject,
            "notification channel disabled; message not sent"
        );
        Ok(())
    }
}
