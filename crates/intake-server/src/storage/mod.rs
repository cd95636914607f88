//! Durable storage for inquiries.
//!
//! [`InquiryStore`] is the contract the intake service depends on;
//! [`IntakeDatabase`] implements it on top of `SQLite`.

mod db;
mod queries;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

use async_trait::async_trait;

use intake_core::{Inquiry, InquiryStatus};

pub use db::IntakeDatabase;
pub use intake_core::db::DatabaseError;

/// Largest page the list query will return.
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Selection for [`InquiryStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InquiryFilter {
    pub status: Option<InquiryStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for InquiryFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl InquiryFilter {
    /// Clamp `limit` into `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            ..self
        }
    }
}

/// Append-mostly inquiry storage.
#[async_trait]
pub trait InquiryStore: Send + Sync {
    /// Write a new inquiry. All columns land or none do.
    async fn insert(&self, inquiry: &Inquiry) -> Result<(), DatabaseError>;

    /// Move an inquiry out of `received`.
    ///
    /// Returns `false` when the inquiry is unknown, already in a terminal
    /// state, or `status` is not terminal.
    async fn update_status(&self, id: &str, status: InquiryStatus) -> Result<bool, DatabaseError>;

    async fn get(&self, id: &str) -> Result<Option<Inquiry>, DatabaseError>;

    /// Newest first.
    async fn list(&self, filter: &InquiryFilter) -> Result<Vec<Inquiry>, DatabaseError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), DatabaseError>;
}
