use std::collections::HashMap;

use tokio::sync::RwLock;

use sitequote_core::domain::lead::{ContactLead, NewsletterSubscriber};
use sitequote_core::domain::quote::{QuoteRequest, QuoteRequestId, StoredQuoteRequest};
use sitequote_core::submission::{
    ContactLeadStore, PersistenceError, QuoteRequestStore, SubscriberStore,
};

use super::new_record_id;

#[derive(Default)]
pub struct InMemoryQuoteRequestRepository {
    requests: RwLock<HashMap<String, QuoteRequest>>,
}

impl InMemoryQuoteRequestRepository {
    pub async fn find_by_id(&self, id: &QuoteRequestId) -> Option<StoredQuoteRequest> {
        let requests = self.requests.read().await;
        requests
            .get(&id.0)
            .cloned()
            .map(|request| StoredQuoteRequest { id: id.clone(), request })
    }

    /// Newest first.
    pub async fn list_recent(&self, limit: usize) -> Vec<StoredQuoteRequest> {
        let requests = self.requests.read().await;
        let mut stored: Vec<StoredQuoteRequest> = requests
            .iter()
            .map(|(id, request)| StoredQuoteRequest {
                id: QuoteRequestId(id.clone()),
                request: request.clone(),
            })
            .collect();
        stored.sort_by(|a, b| {
            b.request.created_at.cmp(&a.request.created_at).then_with(|| a.id.0.cmp(&b.id.0))
        });
        stored.truncate(limit);
        stored
    }

    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl QuoteRequestStore for InMemoryQuoteRequestRepository {
    async fn insert_quote_request(
        &self,
        request: &QuoteRequest,
    ) -> Result<QuoteRequestId, PersistenceError> {
        let id = new_record_id();
        let mut requests = self.requests.write().await;
        requests.insert(id.clone(), request.clone());
        Ok(QuoteRequestId(id))
    }
}

#[derive(Default)]
pub struct InMemoryContactLeadRepository {
    leads: RwLock<HashMap<String, ContactLead>>,
}

impl InMemoryContactLeadRepository {
    pub async fn find_by_id(&self, id: &str) -> Option<ContactLead> {
        self.leads.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leads.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ContactLeadStore for InMemoryContactLeadRepository {
    async fn insert_contact_lead(&self, lead: &ContactLead) -> Result<String, PersistenceError> {
        let id = new_record_id();
        let mut leads = self.leads.write().await;
        leads.insert(id.clone(), lead.clone());
        Ok(id)
    }
}

/// Keyed by email, mirroring the unique constraint of the SQL table.
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<HashMap<String, NewsletterSubscriber>>,
}

#[async_trait::async_trait]
impl SubscriberStore for InMemorySubscriberRepository {
    async fn is_subscribed(&self, email: &str) -> Result<bool, PersistenceError> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.get(email).is_some_and(|subscriber| subscriber.is_active))
    }

    async fn subscribe(&self, subscriber: &NewsletterSubscriber) -> Result<(), PersistenceError> {
        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(subscriber.email.clone())
            .and_modify(|existing| existing.is_active = subscriber.is_active)
            .or_insert_with(|| subscriber.clone());
        Ok(())
    }
}
