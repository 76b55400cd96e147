//! # twilio-notify
//!
//! Send SMS notifications through Twilio from an automation host.
//!
//! Credentials live in named profiles inside the host configuration and are
//! looked up on every call. A send either produces an [`SmsResult`] (the
//! message, or the provider's rejection) or a [`NotifyError`] for anything
//! the provider never got to judge.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use twilio_notify::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ProfileStore::load(None)?;
//!     let app = AppConfig::from_config(store.config())?;
//!     let notifier = NotifierAdapter::load(&app.twilio, Arc::new(store))?;
//!
//!     let result = notifier
//!         .send_sms("my-twilio-account", "Test sms", "+18019999999", "+18011111111")
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [twilio]
//! api_shape = "current"
//!
//! [my-twilio-account.twilio]
//! account_sid = "AC32a3c83990934481addd5ce1659f04d2"
//! auth_token = "mytoken"
//! ```

pub mod config;
pub mod error;
pub mod notifier;
pub mod telemetry;

pub use crate::config::*;
pub use error::NotifyError;
pub use notifier::{Availability, ErrorRecord, MessageRecord, NotifierAdapter, SmsResult};

/// Common imports for twilio-notify usage
pub mod prelude {
    pub use crate::config::{
        AppConfig, ConfigSource, CredentialProfile, LoggingConfig, ProfileStore, TwilioSettings,
    };
    pub use crate::error::NotifyError;
    pub use crate::notifier::{NotifierAdapter, SmsResult};
    pub use crate::telemetry::init_tracing;
    pub use sms_core::*;
    pub use sms_twilio::ApiShape;
}
