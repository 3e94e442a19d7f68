use crate::domain::lead::ContactLead;
use crate::domain::quote::QuoteRequest;
use crate::pricing::money::format_amount;
use crate::submission::ports::Notification;

pub fn quote_request_notification(recipient: &str, request: &QuoteRequest) -> Notification {
    let totals = &request.draft.totals;
    let code = totals.currency_code.as_str();

    let body = [
        "New quote request".to_string(),
        String::new(),
        format!("Client: {}", request.contact_name),
        format!("Email: {}", request.contact_email),
        format!("Phone: {}", request.contact_phone.as_deref().unwrap_or("N/A")),
        String::new(),
        format!("Services: {}", request.draft.titles().join(", ")),
        format!("Total upfront: {}", format_amount(totals.one_time, code)),
        format!("Monthly: {}", format_amount(totals.recurring, code)),
        format!("VAT included: {}", if totals.include_tax { "Yes" } else { "No" }),
        format!("Estimated delivery: {} days", totals.duration_days),
    ]
    .join("\n");

    Notification {
        recipient: recipient.to_string(),
        subject: format!("New Quote Request from {}", request.contact_name),
        body,
    }
}

pub fn contact_lead_notification(recipient: &str, lead: &ContactLead) -> Notification {
    let body = [
        "New contact form submission".to_string(),
        String::new(),
        format!("Email: {}", lead.email),
        "Message:".to_string(),
        lead.message.clone(),
    ]
    .join("\n");

    Notification {
        recipient: recipient.to_string(),
        subject: format!("New Lead: {}", lead.email),
        body,
    }
}
