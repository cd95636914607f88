//! Intake Core Library
//!
//! Shared functionality for the contact intake service:
//! - `Inquiry` records and their notification status
//! - Authoritative validation of contact form submissions
//! - Layered configuration resolution
//! - `SQLite` pool helpers and tracing setup
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod inquiry;
pub mod tracing_init;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use inquiry::{Inquiry, InquiryStatus, Submission};
pub use validation::{Limits, ValidInquiry, ValidationError};
