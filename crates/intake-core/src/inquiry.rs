//! Inquiry records and the raw submission payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValidInquiry;

/// Notification state of a stored inquiry.
///
/// Starts at `Received`; the notification step moves it to one of the two
/// terminal states exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum InquiryStatus {
    Received,
    Notified,
    FailedNotification,
}

impl InquiryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Notified => "notified",
            Self::FailedNotification => "failed-notification",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Received)
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            "notified" => Ok(Self::Notified),
            "failed-notification" => Ok(Self::FailedNotification),
            other => Err(format!("unknown inquiry status: {other}")),
        }
    }
}

/// A persisted contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Unix timestamp (seconds).
    pub submitted_at: i64,
    pub status: InquiryStatus,
}

impl Inquiry {
    /// Build a fresh inquiry in the `Received` state from validated input.
    pub fn new(id: String, submitted_at: i64, input: ValidInquiry) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            subject: input.subject,
            message: input.message,
            phone: input.phone,
            company: input.company,
            submitted_at,
            status: InquiryStatus::Received,
        }
    }
}

/// Contact form body as it arrives on the wire.
///
/// Every field is optional here so that a missing required field is reported
/// by the validator with its name instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}
