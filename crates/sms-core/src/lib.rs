//! # SMS Core
//!
//! Core traits and types shared by the twilio-notify crates.
//!
//! This crate provides the fundamental building blocks for sending a message:
//! - [`SmsClient`] trait for sending SMS messages
//! - [`SentMessage`] describing what the provider accepted
//! - [`ProviderError`] and [`SmsError`] for the two ways a send can fail
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//!
//! let sent = client.send(SendRequest {
//!     to: "+18019999999",
//!     from: "+18011111111",
//!     body: "Hello world!"
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Errors that can occur during SMS operations
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// The provider rejected the request
    #[error("provider error: {0}")]
    Provider(ProviderError),
    /// A success response could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
    /// Unexpected error occurred
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl SmsError {
    /// The structured rejection, if the provider produced one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            SmsError::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// A rejection reported by the provider itself (bad credentials, invalid number, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    /// Provider-specific error code, absent when the body carried none.
    pub code: Option<i64>,
    pub message: String,
    /// HTTP status of the rejected call.
    pub status: u16,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "HTTP {} (code {}): {}", self.status, code, self.message),
            None => write!(f, "HTTP {}: {}", self.status, self.message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub body: &'a str,
}

/// A message accepted by the provider.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentMessage {
    pub sid: String,
    pub price: Option<String>,
    pub price_unit: Option<String>,
    pub status: Option<String>,
    pub num_segments: Option<u32>,
    pub body: Option<String>,
    pub date_sent: Option<OffsetDateTime>,
    pub date_created: Option<OffsetDateTime>,
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Send a single text SMS. Exactly one attempt is made.
    async fn send(&self, req: SendRequest<'_>) -> Result<SentMessage, SmsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_includes_code() {
        let e = ProviderError {
            code: Some(21211),
            message: "Invalid 'To' Phone Number".into(),
            status: 400,
        };
        assert_eq!(e.to_string(), "HTTP 400 (code 21211): Invalid 'To' Phone Number");

        let bare = ProviderError {
            code: None,
            message: "Bad Gateway".into(),
            status: 502,
        };
        assert_eq!(bare.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn as_provider_only_matches_rejections() {
        let e = SmsError::Provider(ProviderError {
            code: Some(20003),
            message: "Authenticate".into(),
            status: 401,
        });
        assert_eq!(e.as_provider().map(|p| p.status), Some(401));
        assert!(SmsError::Http("connection refused".into()).as_provider().is_none());
    }
}
