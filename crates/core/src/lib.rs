pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod submission;

pub use domain::lead::{ContactLead, NewsletterSubscriber};
pub use domain::quote::{
    QuoteDraft, QuoteRequest, QuoteRequestId, RequestStatus, SelectedItemSnapshot,
    StoredQuoteRequest, TotalsSnapshot,
};
pub use domain::service::{ServiceCategory, ServiceId, ServiceLineItem};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    BuilderEvent, BuilderState, Catalog, CatalogError, Currency, PricingPreferences,
    PricingRates, QuoteBuilder, Selection, Totals,
};
pub use submission::{
    ContactPipeline, ContactSubmission, FieldErrors, NewsletterPipeline, NewsletterSubmission,
    Notification, Notifier, QuoteSubmission, QuoteSubmissionPipeline, SubmissionOutcome,
};
