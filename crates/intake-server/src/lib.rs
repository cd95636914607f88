//! Contact intake server.
//!
//! Accepts contact-form submissions over HTTP, validates them, stores each
//! one as an inquiry, and notifies staff in the background. Admin routes
//! expose stored inquiries to holders of an admin bearer token.

pub mod api;
pub mod auth;
pub mod intake;
pub mod notify;
pub mod storage;
