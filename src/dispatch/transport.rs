//! The delivery-provider boundary.

use std::time::Duration;

use thiserror::Error;

use crate::dispatch::wire::MailSendRequest;
use crate::error::{MailtreeError, Result};

/// SendGrid v3 mail-send endpoint.
const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 60;

/// User agent string for API requests.
const USER_AGENT: &str = "mailtree/0.1";

/// A failed delivery attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-accepted status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },
}

/// An opaque mail delivery capability: one request in, success or
/// failure out. The dispatch queue is written against this seam so
/// tests can substitute a fake provider.
pub trait Transport {
    /// Submit one mail-send request.
    fn send(&self, request: &MailSendRequest) -> std::result::Result<(), DeliveryError>;
}

/// The real SendGrid transport.
pub struct SendGridTransport {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl SendGridTransport {
    /// Create a transport using the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MailtreeError::Delivery(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: SENDGRID_ENDPOINT.to_string(),
        })
    }

    /// Override the endpoint URL. Intended for tests against a local
    /// stand-in server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Transport for SendGridTransport {
    fn send(&self, request: &MailSendRequest) -> std::result::Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        // 202 Accepted is the only status SendGrid returns on success.
        if status.as_u16() == 202 {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
