//! Server-side validation of contact form submissions.
//!
//! This is the trust boundary: whatever the browser checked, a submission is
//! only stored once it passes [`validate`]. Checks run in a fixed order and
//! stop at the first violation:
//!
//! 1. `name`, `email`, `subject`, `message` are present and non-blank
//! 2. `email` has the shape `local@domain.tld`
//! 3. every field fits its size bound

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inquiry::Submission;

/// Same shape check the contact form runs client-side. Deliberately loose.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex is valid")
});

/// Per-field size bounds, in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_message_chars: usize,
    pub max_name_chars: usize,
    pub max_email_chars: usize,
    pub max_subject_chars: usize,
    pub max_phone_chars: usize,
    pub max_company_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_chars: 10_000,
            max_name_chars: 200,
            max_email_chars: 320,
            max_subject_chars: 200,
            max_phone_chars: 50,
            max_company_chars: 200,
        }
    }
}

/// Longest JSON encoding of one character: a surrogate pair written as two
/// `\uXXXX` escapes.
pub const MAX_ESCAPED_CHAR_BYTES: usize = 12;

/// Keys, quotes and separators around the six fields.
const ENVELOPE_BYTES: usize = 1024;

impl Limits {
    /// Largest JSON body a submission within these limits can encode to.
    pub const fn max_encoded_bytes(&self) -> usize {
        let chars = self
            .max_message_chars
            .saturating_add(self.max_name_chars)
            .saturating_add(self.max_email_chars)
            .saturating_add(self.max_subject_chars)
            .saturating_add(self.max_phone_chars)
            .saturating_add(self.max_company_chars);
        chars
            .saturating_mul(MAX_ESCAPED_CHAR_BYTES)
            .saturating_add(ENVELOPE_BYTES)
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    /// Name of the offending field, as it appears in the request body.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::TooLong { field, .. } => field,
            Self::InvalidEmail => "email",
        }
    }

    /// Size violations map to `413` rather than `400`.
    pub const fn is_too_large(&self) -> bool {
        matches!(self, Self::TooLong { .. })
    }
}

/// A submission that passed validation, with fields normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInquiry {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Validate a raw submission against `limits`.
pub fn validate(
    submission: &Submission,
    limits: &Limits,
) -> Result<ValidInquiry, ValidationError> {
    let name = required("name", submission.name.as_deref())?;
    let email = required("email", submission.email.as_deref())?;
    let subject = required("subject", submission.subject.as_deref())?;
    let message = required("message", submission.message.as_deref())?;

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    let phone = optional(submission.phone.as_deref());
    let company = optional(submission.company.as_deref());

    bounded("message", message, limits.max_message_chars)?;
    bounded("name", name, limits.max_name_chars)?;
    bounded("email", email, limits.max_email_chars)?;
    bounded("subject", subject, limits.max_subject_chars)?;
    if let Some(phone) = phone {
        bounded("phone", phone, limits.max_phone_chars)?;
    }
    if let Some(company) = company {
        bounded("company", company, limits.max_company_chars)?;
    }

    Ok(ValidInquiry {
        name: name.to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        message: message.to_string(),
        phone: phone.map(str::to_string),
        company: company.map(str::to_string),
    })
}

/// Check the email shape only; no DNS, no RFC 5322 parsing.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Missing { field }),
    }
}

fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
