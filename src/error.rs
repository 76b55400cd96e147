use config::ConfigError;
use sms_core::SmsError;

/// Failures that escape [`crate::NotifierAdapter`].
///
/// Provider rejections are not in here: those come back as an
/// [`crate::SmsResult`] carrying an `_error` record.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The client library is not compiled in
    #[error("{0}")]
    Unavailable(String),
    #[error("profile name must not be empty")]
    EmptyProfile,
    #[error("profile not found: {0}")]
    UnknownProfile(String),
    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Transport or decoding failure talking to the provider
    #[error(transparent)]
    Sms(#[from] SmsError),
}
