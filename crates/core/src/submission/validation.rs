use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_MIN_CHARS: usize = 2;
pub const MESSAGE_MIN_CHARS: usize = 2;

/// Field-keyed validation messages, rendered next to the offending input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    !value.contains("..") && email_pattern().is_some_and(|pattern| pattern.is_match(value))
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        errors.add("email", "Invalid email address");
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

pub fn validate_contact_details(
    name: &str,
    email: &str,
    phone: Option<&str>,
) -> Result<ContactDetails, FieldErrors> {
    let mut errors = FieldErrors::default();
    let name = name.trim();

    if name.chars().count() < NAME_MIN_CHARS {
        errors.add("name", format!("Name must be at least {NAME_MIN_CHARS} characters"));
    }
    check_email(&mut errors, email);

    errors.into_result(ContactDetails {
        name: name.to_string(),
        email: email.trim().to_string(),
        phone: optional_text(phone),
    })
}

pub fn validate_contact_message(email: &str, message: &str) -> Result<(String, String), FieldErrors> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, email);

    let message = message.trim();
    if message.chars().count() < MESSAGE_MIN_CHARS {
        errors.add("message", format!("Message must be at least {MESSAGE_MIN_CHARS} characters"));
    }

    errors.into_result((email.trim().to_string(), message.to_string()))
}

pub fn validate_subscriber_email(email: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, email);
    errors.into_result(email.trim().to_ascii_lowercase())
}
