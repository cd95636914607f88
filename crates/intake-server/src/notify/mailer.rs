//! Transactional-mail HTTP client.
//!
//! Posts `{from, to, subject, text}` as JSON to a configured endpoint with a
//! bearer API key. Most hosted mail APIs accept this shape directly or sit
//! behind a small relay that does.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};

use intake_core::config::NotificationConfig;

use super::{NotificationContent, NotificationError, Notifier};

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mail API client.
#[derive(Debug)]
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    from: String,
}

impl HttpMailer {
    /// Create a mailer posting to `endpoint`.
    ///
    /// `timeout` bounds each send, connect included.
    pub fn new(
        endpoint: &str,
        api_key: Option<&str>,
        from: &str,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        if endpoint.is_empty() {
            return Err(NotificationError::Config("endpoint is empty".into()));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| NotificationError::Config("Invalid API key format".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        // reqwest is built with `rustls-no-provider`; `Err` means a provider
        // is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Config(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            from: from.to_string(),
        })
    }

    /// Build a mailer from settings. `None` when notification is disabled.
    pub fn from_config(config: &NotificationConfig) -> Result<Option<Self>, NotificationError> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };
        Self::new(
            endpoint,
            config.api_key.as_deref(),
            &config.from_address,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(
        &self,
        destination: &str,
        content: &NotificationContent,
    ) -> Result<(), NotificationError> {
        let request = MailRequest {
            from: &self.from,
            to: destination,
            subject: &content.subject,
            text: &content.body,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(to = destination, "Notification email accepted");
            Ok(())
        } else {
            let status_code = status.as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(status = status_code, body = %body, "Mail API returned error");
            Err(NotificationError::Api {
                status: status_code,
                body,
            })
        }
    }
}
