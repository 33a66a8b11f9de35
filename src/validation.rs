//! Explicit field validation.
//!
//! Validators take the already-deserialized request fields and return a list
//! of [`FieldError`]s; an empty list means the input is acceptable. The
//! postcode pattern check is deliberately separate from the generic field
//! checks: it runs after them and yields its own dedicated message (see
//! [`crate::api::handlers::users`]).

use serde::{Deserialize, Serialize};

/// A single violated constraint, reported as a property/message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub property: String,
    pub message: String,
}

impl FieldError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// Validate advice fields. Both fields are required on create; on update the
/// caller passes the merged record, so the same checks apply.
pub fn validate_advice(advice_text: Option<&str>, month: Option<i64>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    match advice_text {
        None => errors.push(FieldError::new("adviceText", "The advice text is required")),
        Some(text) if text.trim().is_empty() => {
            errors.push(FieldError::new("adviceText", "The advice text must not be empty"));
        }
        Some(_) => {}
    }

    match month {
        None => errors.push(FieldError::new("month", "The month is required")),
        Some(m) if !(1..=12).contains(&m) => {
            errors.push(FieldError::new("month", "The month must be between 1 and 12"));
        }
        Some(_) => {}
    }

    errors
}

/// Validate user fields (presence and basic shape). The 5-digit postcode
/// pattern is intentionally NOT checked here; see [`is_valid_post_code`].
pub fn validate_user(email: Option<&str>, password: Option<&str>, post_code: Option<&str>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    match email {
        None => errors.push(FieldError::new("email", "The email address is required")),
        Some(e) if e.trim().is_empty() => errors.push(FieldError::new("email", "The email address must not be empty")),
        Some(e) if !is_plausible_email(e) => {
            errors.push(FieldError::new("email", "The email address is not valid"));
        }
        Some(_) => {}
    }

    match password {
        None => errors.push(FieldError::new("password", "The password is required")),
        Some(p) if p.is_empty() => errors.push(FieldError::new("password", "The password must not be empty")),
        Some(_) => {}
    }

    if post_code.is_none() {
        errors.push(FieldError::new("postcode", "The postcode is required"));
    }

    errors
}

/// Validate a user update. Email and postcode are the merged values (always
/// present once an existing record is loaded); the password is checked only
/// when the request supplies a replacement.
pub fn validate_user_update(email: &str, password: Option<&str>, post_code: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "The email address must not be empty"));
    } else if !is_plausible_email(email) {
        errors.push(FieldError::new("email", "The email address is not valid"));
    }

    if let Some(p) = password
        && p.is_empty()
    {
        errors.push(FieldError::new("password", "The password must not be empty"));
    }

    if post_code.is_empty() {
        errors.push(FieldError::new("postcode", "The postcode is required"));
    }

    errors
}

/// Exact 5-digit postcode pattern (`^\d{5}$`).
pub fn is_valid_post_code(post_code: &str) -> bool {
    post_code.len() == 5 && post_code.bytes().all(|b| b.is_ascii_digit())
}

// Good enough for a presence-plus-shape check: one '@' with something on
// either side. Deliverability is not our problem.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}
