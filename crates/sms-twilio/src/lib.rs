//! # Twilio SMS Provider
//!
//! Twilio REST client for twilio-notify.
//!
//! Two endpoint families exist for outbound SMS and they are not
//! interchangeable, so a client is bound to one [`ApiShape`] at construction:
//!
//! - [`ApiShape::Legacy`] posts to `/2010-04-01/Accounts/{sid}/SMS/Messages.json`
//! - [`ApiShape::Current`] posts to `/2010-04-01/Accounts/{sid}/Messages.json`
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//! use sms_twilio::TwilioClient;
//!
//! let client = TwilioClient::new(Some("AC123".into()), Some("token".into()));
//! let sent = client.send(SendRequest {
//!     to: "+18019999999",
//!     from: "+18011111111",
//!     body: "Hello from Twilio!"
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sms_core::{ProviderError, SendRequest, SentMessage, SmsClient, SmsError};
use std::str::FromStr;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;
#[cfg(feature = "reqwest")]
use tracing::debug;
use tracing::warn;

const API_VERSION: &str = "2010-04-01";
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Whether the HTTP transport was compiled in.
pub const fn is_available() -> bool {
    cfg!(feature = "reqwest")
}

/// Which Twilio message endpoint family to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiShape {
    /// The deprecated `SMS/Messages` resource.
    Legacy,
    #[default]
    Current,
}

impl ApiShape {
    fn resource(self) -> &'static str {
        match self {
            ApiShape::Legacy => "SMS/Messages.json",
            ApiShape::Current => "Messages.json",
        }
    }
}

impl FromStr for ApiShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ApiShape::Legacy),
            "current" => Ok(ApiShape::Current),
            other => Err(format!("unknown twilio api shape: {}", other)),
        }
    }
}

/// Twilio REST client.
#[derive(Clone)]
pub struct TwilioClient {
    /// Twilio Account SID. Not validated; a missing value surfaces as a provider rejection.
    pub account_sid: Option<String>,
    auth_token: Option<String>,
    /// API base URL; override for testing/mocking.
    pub base_url: String,
    pub shape: ApiShape,
    #[cfg(feature = "reqwest")]
    http: reqwest::Client,
}

// Keep the auth token out of logs.
impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<REDACTED>"))
            .field("base_url", &self.base_url)
            .field("shape", &self.shape)
            .finish()
    }
}

impl TwilioClient {
    pub fn new(account_sid: Option<String>, auth_token: Option<String>) -> Self {
        Self::with_base_url(account_sid, auth_token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(
        account_sid: Option<String>,
        auth_token: Option<String>,
        base_url: String,
    ) -> Self {
        Self {
            account_sid,
            auth_token,
            base_url,
            shape: ApiShape::default(),
            #[cfg(feature = "reqwest")]
            http: reqwest::Client::new(),
        }
    }

    pub fn with_shape(mut self, shape: ApiShape) -> Self {
        self.shape = shape;
        self
    }

    /// Full URL of the message-send resource for this client's shape.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/{}",
            self.base_url.trim_end_matches('/'),
            API_VERSION,
            self.account_sid.as_deref().unwrap_or_default(),
            self.shape.resource()
        )
    }
}

#[cfg(feature = "reqwest")]
#[derive(Debug, Serialize)]
struct TwilioSendForm<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

/// Message resource as returned by either endpoint family.
#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    price_unit: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    num_segments: Option<StringOrNumber>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    date_sent: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
}

// Twilio encodes counts as strings on the current API and as numbers on some older payloads.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(u32),
    String(String),
}

impl StringOrNumber {
    fn as_u32(&self) -> Option<u32> {
        match self {
            StringOrNumber::Number(n) => Some(*n),
            StringOrNumber::String(s) => s.trim().parse().ok(),
        }
    }
}

/// Twilio's JSON error envelope.
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
    #[allow(dead_code)]
    more_info: Option<String>,
    status: Option<u16>,
}

fn parse_timestamp(raw: Option<&str>) -> Option<OffsetDateTime> {
    let raw = raw?;
    match OffsetDateTime::parse(raw, &Rfc2822) {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!("Unparseable Twilio timestamp {:?}: {}", raw, e);
            None
        }
    }
}

/// Decode a 2xx message resource body.
pub fn parse_message(raw: serde_json::Value) -> Result<SentMessage, SmsError> {
    let msg: TwilioMessage = serde_json::from_value(raw)
        .map_err(|e| SmsError::Decode(format!("message resource: {}", e)))?;
    Ok(SentMessage {
        sid: msg.sid,
        price: msg.price,
        price_unit: msg.price_unit,
        status: msg.status,
        num_segments: msg.num_segments.as_ref().and_then(StringOrNumber::as_u32),
        body: msg.body,
        date_sent: parse_timestamp(msg.date_sent.as_deref()),
        date_created: parse_timestamp(msg.date_created.as_deref()),
    })
}

/// Decode a non-2xx response into the provider's rejection.
pub fn parse_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<TwilioErrorBody>(body) {
        Ok(err) => ProviderError {
            code: err.code,
            message: err.message.unwrap_or_else(|| body.to_string()),
            status: err.status.unwrap_or(status),
        },
        Err(_) => ProviderError {
            code: None,
            message: body.trim().to_string(),
            status,
        },
    }
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send(&self, req: SendRequest<'_>) -> Result<SentMessage, SmsError> {
        #[cfg(not(feature = "reqwest"))]
        {
            let _ = req;
            return Err(SmsError::Unexpected("reqwest feature disabled".into()));
        }
        #[cfg(feature = "reqwest")]
        {
            let url = self.messages_url();
            debug!("POST {} ({:?} shape) to {}", url, self.shape, req.to);
            let form = TwilioSendForm {
                to: req.to,
                from: req.from,
                body: req.body,
            };
            let res = self
                .http
                .post(url)
                .basic_auth(
                    self.account_sid.as_deref().unwrap_or_default(),
                    Some(self.auth_token.as_deref().unwrap_or_default()),
                )
                .form(&form)
                .send()
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;

            let status = res.status();
            let raw_text = res
                .text()
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;

            if !status.is_success() {
                return Err(SmsError::Provider(parse_error(status.as_u16(), &raw_text)));
            }

            let raw_json: serde_json::Value = serde_json::from_str(&raw_text)
                .map_err(|e| SmsError::Decode(format!("invalid JSON: {}", e)))?;
            parse_message(raw_json)
        }
    }
}
