//! Operator notification channels.
//!
//! `notifier_from_config` picks the HTTP email notifier when an API key is
//! configured and the disabled notifier otherwise.

pub mod disabled;
pub mod email_api;

use std::sync::Arc;

use sitequote_core::config::NotificationConfig;
use sitequote_core::submission::Notifier;

pub use disabled::DisabledNotifier;
pub use email_api::{EmailApiNotifier, NotifierBuildError};

pub fn notifier_from_config(
    config: &NotificationConfig,
) -> Result<Arc<dyn Notifier>, NotifierBuildError> {
    match config.api_key.clone().filter(|_| config.is_enabled()) {
        Some(api_key) => {
            tracing::info!(
                event_name = "notify.channel.selected",
                channel = "email_api",
                api_url = %config.api_url,
                "email notifications enabled"
            );
            Ok(Arc::new(EmailApiNotifier::new(
                config.api_url.clone(),
                api_key,
                config.sender.clone(),
                config.timeout_secs,
            )?))
        }
        None => {
            tracing::warn!(
                event_name = "notify.channel.selected",
                channel = "disabled",
                "no notification api key configured; operator notifications are skipped"
            );
            Ok(Arc::new(DisabledNotifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use sitequote_core::config::AppConfig;

    use super::notifier_from_config;

    #[test]
    fn missing_api_key_selects_disabled_notifier() {
        let config = AppConfig::default();
        assert!(notifier_from_config(&config.notification).is_ok());
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let mut config = AppConfig::default();
        config.notification.api_key = Some("   ".to_string().into());
        assert!(!config.notification.is_enabled());
        assert!(notifier_from_config(&config.notification).is_ok());
    }
}
