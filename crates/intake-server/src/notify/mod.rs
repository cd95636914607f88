//! Staff notification for new inquiries.
//!
//! - [`Notifier`] is the delivery contract: one destination, one message
//! - [`HttpMailer`] delivers through a transactional-mail HTTP API
//! - [`NotificationContent`] renders an inquiry into a plain-text email

pub mod mailer;

use async_trait::async_trait;

use intake_core::Inquiry;

pub use mailer::HttpMailer;

/// Subject line of every staff notification.
pub const NOTIFICATION_SUBJECT: &str = "New Contact Form Submission";

/// Errors that can occur while notifying staff.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The mailer could not be constructed from its settings.
    #[error("Notification config error: {0}")]
    Config(String),

    /// The HTTP request did not complete (connect, TLS, timeout).
    #[error("Notification request error: {0}")]
    Request(String),

    /// The mail API answered with a non-success status.
    #[error("Mail API error (status {status}): {body}")]
    Api {
        /// HTTP status code returned by the mail API.
        status: u16,
        /// Response body from the mail API.
        body: String,
    },
}

/// Rendered notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub subject: String,
    pub body: String,
}

impl NotificationContent {
    /// Render the staff email for an inquiry.
    pub fn for_inquiry(inquiry: &Inquiry) -> Self {
        let body = format!(
            "New Contact Submission:\n\n\
             Name: {name}\n\
             Email: {email}\n\
             Company: {company}\n\
             Phone: {phone}\n\
             Subject: {subject}\n\
             Reference: {id}\n\n\
             Message:\n{message}",
            name = inquiry.name,
            email = inquiry.email,
            company = inquiry.company.as_deref().unwrap_or("N/A"),
            phone = inquiry.phone.as_deref().unwrap_or("N/A"),
            subject = inquiry.subject,
            id = inquiry.id,
            message = inquiry.message,
        );

        Self {
            subject: NOTIFICATION_SUBJECT.to_string(),
            body,
        }
    }
}

/// Delivery channel for staff notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        content: &NotificationContent,
    ) -> Result<(), NotificationError>;
}
