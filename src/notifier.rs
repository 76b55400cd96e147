use crate::config::{ConfigSource, TwilioSettings};
use crate::error::NotifyError;
use serde::{Deserialize, Serialize};
use sms_core::{ProviderError, SendRequest, SentMessage, SmsClient, SmsError};
use sms_twilio::{ApiShape, TwilioClient};
use std::sync::{Arc, OnceLock};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

pub const UNAVAILABLE_REASON: &str = "The twilio_notify module failed to load: the twilio client library is not installed.";

/// Outcome of the one-time load probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available(ApiShape),
    Unavailable(&'static str),
}

impl Availability {
    pub fn probe(transport_compiled: bool, shape: ApiShape) -> Self {
        if transport_compiled {
            Availability::Available(shape)
        } else {
            Availability::Unavailable(UNAVAILABLE_REASON)
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }
}

static AVAILABILITY: OnceLock<Availability> = OnceLock::new();

/// Process-wide availability. The first caller's settings fix the API shape
/// for the rest of the process.
pub fn availability(settings: &TwilioSettings) -> Availability {
    *AVAILABILITY
        .get_or_init(|| Availability::probe(sms_twilio::is_available(), settings.api_shape))
}

/// Normalized outcome of [`NotifierAdapter::send_sms`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsResult {
    pub message: MessageRecord,
    #[serde(rename = "_error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub sid: Option<String>,
    pub price: Option<String>,
    pub price_unit: Option<String>,
    pub status: Option<String>,
    pub num_segments: Option<u32>,
    pub body: Option<String>,
    pub date_sent: Option<String>,
    pub date_created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: Option<i64>,
    pub msg: String,
    pub status: u16,
}

fn render(ts: Option<OffsetDateTime>) -> Option<String> {
    ts.map(|ts| ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string()))
}

impl From<SentMessage> for SmsResult {
    fn from(m: SentMessage) -> Self {
        Self {
            message: MessageRecord {
                sid: Some(m.sid),
                price: m.price,
                price_unit: m.price_unit,
                status: m.status,
                num_segments: m.num_segments,
                body: m.body,
                date_sent: render(m.date_sent),
                date_created: render(m.date_created),
            },
            error: None,
        }
    }
}

impl From<ProviderError> for SmsResult {
    fn from(e: ProviderError) -> Self {
        Self {
            message: MessageRecord::default(),
            error: Some(ErrorRecord {
                code: e.code,
                msg: e.message,
                status: e.status,
            }),
        }
    }
}

impl SmsResult {
    pub fn is_sent(&self) -> bool {
        self.message.sid.is_some()
    }
}

/// Sends SMS through Twilio using credentials looked up by profile name.
#[derive(Clone)]
pub struct NotifierAdapter {
    shape: ApiShape,
    source: Arc<dyn ConfigSource>,
}

impl std::fmt::Debug for NotifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierAdapter")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl NotifierAdapter {
    /// Load the adapter, or report why it cannot be used.
    pub fn load(settings: &TwilioSettings, source: Arc<dyn ConfigSource>) -> Result<Self, NotifyError> {
        Self::from_availability(availability(settings), source)
    }

    pub fn from_availability(
        availability: Availability,
        source: Arc<dyn ConfigSource>,
    ) -> Result<Self, NotifyError> {
        match availability {
            Availability::Available(shape) => Ok(Self { shape, source }),
            Availability::Unavailable(reason) => Err(NotifyError::Unavailable(reason.to_string())),
        }
    }

    pub fn shape(&self) -> ApiShape {
        self.shape
    }

    /// Build a client from the named profile. Missing credential fields are
    /// passed through; they only fail once the provider is called.
    pub fn resolve_client(&self, profile_name: &str) -> Result<TwilioClient, NotifyError> {
        if profile_name.is_empty() {
            return Err(NotifyError::EmptyProfile);
        }
        let profile = self
            .source
            .option(profile_name)?
            .ok_or_else(|| NotifyError::UnknownProfile(profile_name.to_string()))?;
        let creds = profile.credentials();

        let client = match creds.base_url {
            Some(base_url) => TwilioClient::with_base_url(creds.account_sid, creds.auth_token, base_url),
            None => TwilioClient::new(creds.account_sid, creds.auth_token),
        }
        .with_shape(self.shape);

        debug!("Resolved twilio client for profile {}: {:?}", profile_name, client);
        Ok(client)
    }

    /// Send one SMS. Provider rejections are folded into the result; any
    /// other failure is returned as an error.
    pub async fn send_sms(
        &self,
        profile_name: &str,
        body: &str,
        to: &str,
        from: &str,
    ) -> Result<SmsResult, NotifyError> {
        let client = self.resolve_client(profile_name)?;

        match client.send(SendRequest { to, from, body }).await {
            Ok(sent) => {
                let result = SmsResult::from(sent);
                info!("Sent sms: {:?}", result);
                Ok(result)
            }
            Err(SmsError::Provider(e)) => {
                let result = SmsResult::from(e);
                debug!("Could not send sms. Error: {:?}", result);
                Ok(result)
            }
            Err(e) => Err(e.into()),
        }
    }
}
