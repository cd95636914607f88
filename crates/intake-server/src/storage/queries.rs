//! Inquiry queries.

use async_trait::async_trait;

use intake_core::{Inquiry, InquiryStatus};

use super::db::IntakeDatabase;
use super::{DatabaseError, InquiryFilter, InquiryStore};

impl IntakeDatabase {
    /// Insert a new inquiry.
    ///
    /// A single `INSERT` statement, so the row is either fully written or
    /// absent.
    pub async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO inquiries \
             (id, name, email, subject, message, phone, company, submitted_at, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&inquiry.id)
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.subject)
        .bind(&inquiry.message)
        .bind(inquiry.phone.as_deref())
        .bind(inquiry.company.as_deref())
        .bind(inquiry.submitted_at)
        .bind(inquiry.status.as_str())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Get an inquiry by ID.
    pub async fn get_inquiry(&self, id: &str) -> Result<Option<Inquiry>, DatabaseError> {
        let inquiry = sqlx::query_as::<_, Inquiry>("SELECT * FROM inquiries WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(inquiry)
    }

    /// Record the outcome of the notification step.
    ///
    /// Only rows still in `received` are touched.
    pub async fn update_inquiry_status(
        &self,
        id: &str,
        status: InquiryStatus,
    ) -> Result<bool, DatabaseError> {
        if !status.is_terminal() {
            return Ok(false);
        }

        let result = sqlx::query("UPDATE inquiries SET status = ? WHERE id = ? AND status = ?")
            .bind(status.as_str())
            .bind(id)
            .bind(InquiryStatus::Received.as_str())
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List inquiries, newest first.
    pub async fn list_inquiries(
        &self,
        filter: &InquiryFilter,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        let filter = filter.clamped();

        let inquiries = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, Inquiry>(
                    "SELECT * FROM inquiries WHERE status = ? \
                     ORDER BY submitted_at DESC, rowid DESC LIMIT ? OFFSET ?",
                )
                .bind(status.as_str())
                .bind(i64::from(filter.limit))
                .bind(i64::from(filter.offset))
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, Inquiry>(
                    "SELECT * FROM inquiries \
                     ORDER BY submitted_at DESC, rowid DESC LIMIT ? OFFSET ?",
                )
                .bind(i64::from(filter.limit))
                .bind(i64::from(filter.offset))
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(inquiries)
    }
}

#[async_trait]
impl InquiryStore for IntakeDatabase {
    async fn insert(&self, inquiry: &Inquiry) -> Result<(), DatabaseError> {
        self.insert_inquiry(inquiry).await
    }

    async fn update_status(&self, id: &str, status: InquiryStatus) -> Result<bool, DatabaseError> {
        self.update_inquiry_status(id, status).await
    }

    async fn get(&self, id: &str) -> Result<Option<Inquiry>, DatabaseError> {
        self.get_inquiry(id).await
    }

    async fn list(&self, filter: &InquiryFilter) -> Result<Vec<Inquiry>, DatabaseError> {
        self.list_inquiries(filter).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
