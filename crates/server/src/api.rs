//! JSON surface for the pricing calculator and the lead-capture forms.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sitequote_core::domain::service::{ServiceCategory, ServiceId, ServiceLineItem};
use sitequote_core::errors::{ApplicationError, DomainError, InterfaceError};
use sitequote_core::pricing::{
    BuilderEvent, Catalog, Currency, FormattedTotals, PricingPreferences, PricingRates,
    QuoteBuilder, Totals,
};
use sitequote_core::submission::{
    ContactPipeline, ContactSubmission, NewsletterPipeline, NewsletterSubmission,
    QuoteSubmission, QuoteSubmissionPipeline, SubmissionOutcome,
};

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<Catalog>,
    pub rates: PricingRates,
    pub quotes: Arc<QuoteSubmissionPipeline>,
    pub contacts: Arc<ContactPipeline>,
    pub newsletter: Arc<NewsletterPipeline>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/catalog", get(catalog))
        .route("/api/v1/quote/preview", post(preview_quote))
        .route("/api/v1/quote-requests", post(submit_quote_request))
        .route("/api/v1/contact", post(submit_contact))
        .route("/api/v1/newsletter", post(subscribe_newsletter))
        .with_state(state)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Clone, Debug, Serialize)]
pub struct CategoryGroup {
    pub category: ServiceCategory,
    pub single_choice: bool,
    pub items: Vec<ServiceLineItem>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CatalogResponse {
    pub default_base_package: ServiceId,
    pub reference_currency: String,
    pub local_currency: String,
    pub exchange_rate: Decimal,
    pub tax_rate: Decimal,
    pub categories: Vec<CategoryGroup>,
}

/// Client-held builder state. `toggle` is applied after the selection is
/// restored, so one round trip both edits and prices the quote.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub selected: Vec<ServiceId>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub include_tax: bool,
    #[serde(default)]
    pub toggle: Option<ServiceId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PreviewResponse {
    pub selected: Vec<ServiceId>,
    pub items: Vec<ServiceLineItem>,
    pub currency: Currency,
    pub currency_code: String,
    pub include_tax: bool,
    pub totals: Totals,
    pub formatted: FormattedTotals,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuoteRequestBody {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub selected: Vec<ServiceId>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub include_tax: bool,
}

pub async fn catalog(State(state): State<ApiState>) -> Json<CatalogResponse> {
    let categories = ServiceCategory::ALL
        .into_iter()
        .map(|category| CategoryGroup {
            category,
            single_choice: category.is_single_choice(),
            items: state.catalog.items_by_category(category).cloned().collect(),
        })
        .filter(|group| !group.items.is_empty())
        .collect();

    Json(CatalogResponse {
        default_base_package: state.catalog.default_base_package().clone(),
        reference_currency: state.rates.reference_code.clone(),
        local_currency: state.rates.local_code.clone(),
        exchange_rate: state.rates.exchange_rate,
        tax_rate: state.rates.tax_rate,
        categories,
    })
}

pub async fn preview_quote(
    State(state): State<ApiState>,
    Json(body): Json<PreviewRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    let mut builder = restore_builder(&state, body.selected, body.currency, body.include_tax)?;
    if let Some(id) = body.toggle {
        builder.apply(BuilderEvent::Toggle(id)).map_err(domain_error)?;
    }

    let totals = builder.compute_totals();
    let preferences = builder.state().preferences;
    Ok(Json(PreviewResponse {
        selected: builder.selected_items().iter().map(|item| item.id.clone()).collect(),
        items: builder.selected_items().into_iter().cloned().collect(),
        currency: preferences.currency,
        currency_code: builder.currency_code().to_string(),
        include_tax: preferences.include_tax,
        formatted: totals.formatted(builder.currency_code()),
        totals,
    }))
}

/// Totals are recomputed from the submitted ids; client-side amounts are never
/// accepted.
pub async fn submit_quote_request(
    State(state): State<ApiState>,
    Json(body): Json<QuoteRequestBody>,
) -> ApiResult<(StatusCode, Json<SubmissionOutcome>)> {
    let builder = restore_builder(&state, body.selected, body.currency, body.include_tax)?;
    let outcome = state
        .quotes
        .submit(QuoteSubmission {
            name: body.name,
            email: body.email,
            phone: body.phone,
            draft: builder.draft(),
        })
        .await;

    Ok(outcome_response(outcome))
}

pub async fn submit_contact(
    State(state): State<ApiState>,
    Json(body): Json<ContactSubmission>,
) -> (StatusCode, Json<SubmissionOutcome>) {
    outcome_response(state.contacts.submit(body).await)
}

pub async fn subscribe_newsletter(
    State(state): State<ApiState>,
    Json(body): Json<NewsletterSubmission>,
) -> (StatusCode, Json<SubmissionOutcome>) {
    outcome_response(state.newsletter.submit(body).await)
}

fn restore_builder(
    state: &ApiState,
    selected: Vec<ServiceId>,
    currency: Currency,
    include_tax: bool,
) -> ApiResult<QuoteBuilder> {
    QuoteBuilder::restore(
        Arc::clone(&state.catalog),
        state.rates.clone(),
        selected,
        PricingPreferences { currency, include_tax },
    )
    .map_err(domain_error)
}

fn outcome_response(outcome: SubmissionOutcome) -> (StatusCode, Json<SubmissionOutcome>) {
    let status = if outcome.success {
        StatusCode::OK
    } else if outcome.is_validation_failure() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(outcome))
}

fn domain_error(error: DomainError) -> (StatusCode, Json<ApiError>) {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    interface_error(ApplicationError::from(error).into_interface(correlation_id))
}

fn interface_error(error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let (status, detail) = match &error {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, String::new())
        }
        InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
    };

    if status == StatusCode::BAD_REQUEST {
        debug!(
            event_name = "api.request.rejected",
            correlation_id = error.correlation_id(),
            error = %error,
            "request rejected"
        );
    } else {
        warn!(
            event_name = "api.request.failed",
            correlation_id = error.correlation_id(),
            error = %error,
            "request failed"
        );
    }

    (
        status,
        Json(ApiError {
            error: error.user_message().to_string(),
            detail,
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
