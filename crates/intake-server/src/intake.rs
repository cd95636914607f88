//! Contact intake: validate, persist, then notify staff in the background.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use intake_core::db::unix_timestamp;
use intake_core::validation::{self, Limits, ValidationError};
use intake_core::{Inquiry, InquiryStatus, Submission};

use crate::notify::{NotificationContent, Notifier};
use crate::storage::{DatabaseError, InquiryFilter, InquiryStore};

/// Why a submission was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Invalid(ValidationError),

    /// A field exceeds its size bound.
    #[error("{0}")]
    TooLarge(ValidationError),

    /// The write failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The write did not finish within the write budget. It may still have
    /// committed, leaving inquiry `id` in `received` with no notification.
    #[error("Storage unavailable: write of inquiry {id} timed out")]
    WriteTimedOut { id: String },
}

impl IntakeError {
    /// Whether the caller should see this as a storage outage.
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable(_) | Self::WriteTimedOut { .. }
        )
    }
}

impl From<ValidationError> for IntakeError {
    fn from(e: ValidationError) -> Self {
        if e.is_too_large() {
            Self::TooLarge(e)
        } else {
            Self::Invalid(e)
        }
    }
}

impl From<DatabaseError> for IntakeError {
    fn from(e: DatabaseError) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

/// Outcome of an accepted submission.
#[derive(Debug)]
pub struct Receipt {
    pub id: String,
    /// Background notification task, resolving to the recorded status.
    /// `None` when notification is disabled. Dropping it detaches the task.
    pub notification: Option<JoinHandle<InquiryStatus>>,
}

#[derive(Clone)]
struct StaffNotifier {
    notifier: Arc<dyn Notifier>,
    destination: String,
}

/// The intake service. Cheap to share behind an `Arc`.
pub struct IntakeService {
    store: Arc<dyn InquiryStore>,
    staff: Option<StaffNotifier>,
    limits: Limits,
    write_timeout: Duration,
}

impl IntakeService {
    pub fn new(store: Arc<dyn InquiryStore>, limits: Limits, write_timeout: Duration) -> Self {
        Self {
            store,
            staff: None,
            limits,
            write_timeout,
        }
    }

    /// Notify `destination` through `notifier` after every accepted inquiry.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, destination: &str) -> Self {
        self.staff = Some(StaffNotifier {
            notifier,
            destination: destination.to_string(),
        });
        self
    }

    /// Validate and store a submission, then start the staff notification.
    ///
    /// Returns as soon as the write has succeeded; the notification runs on
    /// its own task and never affects the result. Identical submissions are
    /// stored as separate inquiries.
    #[instrument(skip_all)]
    pub async fn submit_inquiry(&self, submission: &Submission) -> Result<Receipt, IntakeError> {
        let valid = validation::validate(submission, &self.limits).inspect_err(|e| {
            info!(field = e.field(), reason = %e, "Submission rejected");
        })?;

        let id = uuid::Uuid::new_v4().to_string();
        let inquiry = Inquiry::new(id.clone(), unix_timestamp(), valid);

        let write = tokio::time::timeout(self.write_timeout, self.store.insert(&inquiry));
        match write.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to store inquiry");
                return Err(e.into());
            }
            Err(_) => {
                let budget_ms = u64::try_from(self.write_timeout.as_millis()).unwrap_or(u64::MAX);
                // The abandoned write may still land; the id is what an
                // operator reconciles against.
                warn!(id = %id, budget_ms, "Inquiry write timed out");
                return Err(IntakeError::WriteTimedOut { id });
            }
        }

        info!(id = %id, "Inquiry stored");

        let notification = self.staff.clone().map(|staff| {
            let store = Arc::clone(&self.store);
            tokio::spawn(notify_staff(store, staff, inquiry))
        });

        Ok(Receipt { id, notification })
    }

    pub async fn get_inquiry(&self, id: &str) -> Result<Option<Inquiry>, IntakeError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_inquiries(
        &self,
        filter: &InquiryFilter,
    ) -> Result<Vec<Inquiry>, IntakeError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn is_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Storage health check failed");
                false
            }
        }
    }
}

/// Send one notification and record the outcome. No retries: anything left
/// in `failed-notification` is for out-of-band reconciliation.
async fn notify_staff(
    store: Arc<dyn InquiryStore>,
    staff: StaffNotifier,
    inquiry: Inquiry,
) -> InquiryStatus {
    let id = &inquiry.id;
    let content = NotificationContent::for_inquiry(&inquiry);
    let status = match staff.notifier.send(&staff.destination, &content).await {
        Ok(()) => {
            info!(id = %id, "Staff notified");
            InquiryStatus::Notified
        }
        Err(e) => {
            warn!(id = %id, error = %e, "Staff notification failed");
            InquiryStatus::FailedNotification
        }
    };

    match store.update_status(id, status).await {
        Ok(true) => status,
        Ok(false) => {
            warn!(id = %id, status = %status, "Inquiry status already settled");
            status
        }
        Err(e) => {
            warn!(
                id = %id,
                status = %status,
                error = %e,
                "Failed to record notification status"
            );
            InquiryStatus::Received
        }
    }
}
