use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use intake_core::{Inquiry, InquiryStatus, Submission};

use super::AppState;
use super::error::ApiError;
use crate::auth::{Claims, authorize_admin};
use crate::storage::{DEFAULT_PAGE_SIZE, InquiryFilter};

/// Verified admin caller. Extracting it rejects with 401/403.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authorize_admin(&state.jwt, &parts.headers)?))
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: String,
}

/// `POST /api/contact`
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let Json(submission) = payload?;
    // Dropping the receipt's handle leaves notification running detached.
    let receipt = state.intake.submit_inquiry(&submission).await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id: receipt.id })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListParams {
    fn into_filter(self) -> Result<InquiryFilter, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<InquiryStatus>)
            .transpose()
            .map_err(|e| ApiError::validation("status", e))?;
        Ok(InquiryFilter {
            status,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        }
        .clamped())
    }
}

/// `GET /api/contact` (admin)
pub async fn list_inquiries(
    AdminClaims(claims): AdminClaims,
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Inquiry>>, ApiError> {
    let Query(params) = params?;
    let filter = params.into_filter()?;
    let inquiries = state.intake.list_inquiries(&filter).await?;
    info!(admin = %claims.sub, count = inquiries.len(), "Listed inquiries");
    Ok(Json(inquiries))
}

/// `GET /api/contact/{id}` (admin)
pub async fn get_inquiry(
    AdminClaims(claims): AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Inquiry>, ApiError> {
    let inquiry = state
        .intake
        .get_inquiry(&id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(admin = %claims.sub, id = %id, "Fetched inquiry");
    Ok(Json(inquiry))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    if state.intake.is_healthy().await {
        (StatusCode::OK, Json(json!({"status": "ok", "db": "up"}))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "error", "db": "down"})),
        )
            .into_response()
    }
}
