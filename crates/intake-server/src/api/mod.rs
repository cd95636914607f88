//! HTTP surface.
//!
//! | Route | Access |
//! |---|---|
//! | `POST /api/contact` | public |
//! | `GET /api/contact` | admin token |
//! | `GET /api/contact/{id}` | admin token |
//! | `GET /health` | public |

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use intake_core::config::ServerConfig;

use crate::auth::JwtManager;
use crate::intake::IntakeService;

pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeService>,
    pub jwt: Arc<JwtManager>,
}

/// Build the router with body limit, CORS and request tracing applied.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route(
            "/api/contact",
            get(routes::list_inquiries).post(routes::submit_contact),
        )
        .route("/api/contact/{id}", get(routes::get_inquiry))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(cors_layer(&server.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
