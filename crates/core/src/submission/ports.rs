use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lead::{ContactLead, NewsletterSubscriber};
use crate::domain::quote::{QuoteRequest, QuoteRequestId};
use crate::errors::ApplicationError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("persistence failed: {message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("notification failed: {message}")]
pub struct NotificationError {
    pub message: String,
}

impl NotificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<PersistenceError> for ApplicationError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value.message)
    }
}

impl From<NotificationError> for ApplicationError {
    fn from(value: NotificationError) -> Self {
        Self::Notification(value.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait QuoteRequestStore: Send + Sync {
    async fn insert_quote_request(
        &self,
        request: &QuoteRequest,
    ) -> Result<QuoteRequestId, PersistenceError>;
}

#[async_trait]
pub trait ContactLeadStore: Send + Sync {
    async fn insert_contact_lead(&self, lead: &ContactLead) -> Result<String, PersistenceError>;
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn is_subscribed(&self, email: &str) -> Result<bool, PersistenceError>;
    async fn subscribe(&self, subscriber: &NewsletterSubscriber) -> Result<(), PersistenceError>;
}

/// Outbound operator channel. Callers treat failures as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}
