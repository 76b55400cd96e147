use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sms_twilio::ApiShape;
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Prefix for environment overrides, e.g. `TWILIO_NOTIFY__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "TWILIO_NOTIFY";

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Adapter-wide Twilio settings
    #[serde(default)]
    pub twilio: TwilioSettings,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

/// Settings fixed for the lifetime of the process
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TwilioSettings {
    /// Endpoint family: legacy or current (default: current)
    #[serde(default)]
    pub api_shape: ApiShape,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Build the layered configuration every loader in this crate reads from.
///
/// Sources, lowest precedence first: built-in defaults, `config/default`,
/// `config/{RUN_MODE}`, `config/local`, the optional `extra` file, then
/// `TWILIO_NOTIFY__*` environment variables.
pub fn layered(extra: Option<&Path>) -> Result<Config, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let mut builder = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
        // Local overrides (gitignored)
        .add_source(File::with_name("config/local").required(false));

    if let Some(path) = extra {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_config(&layered(None)?)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.clone().try_deserialize()
    }
}

/// Credentials stored under a profile name.
///
/// ```toml
/// [my-twilio-account.twilio]
/// account_sid = "AC32a3c83990934481addd5ce1659f04d2"
/// auth_token = "mytoken"
/// ```
///
/// Flat dotted keys are accepted too, and win over the nested table:
///
/// ```yaml
/// my-twilio-account:
///   twilio.account_sid: AC32a3c83990934481addd5ce1659f04d2
///   twilio.auth_token: mytoken
/// ```
#[derive(Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CredentialProfile {
    #[serde(default)]
    twilio: TwilioCredentials,
    #[serde(rename = "twilio.account_sid", default, skip_serializing_if = "Option::is_none")]
    flat_account_sid: Option<String>,
    #[serde(rename = "twilio.auth_token", default, skip_serializing_if = "Option::is_none")]
    flat_auth_token: Option<String>,
    #[serde(rename = "twilio.base_url", default, skip_serializing_if = "Option::is_none")]
    flat_base_url: Option<String>,
}

impl CredentialProfile {
    /// Effective credentials, flat keys taking precedence over the nested table.
    pub fn credentials(&self) -> TwilioCredentials {
        TwilioCredentials {
            account_sid: self
                .flat_account_sid
                .clone()
                .or_else(|| self.twilio.account_sid.clone()),
            auth_token: self
                .flat_auth_token
                .clone()
                .or_else(|| self.twilio.auth_token.clone()),
            base_url: self
                .flat_base_url
                .clone()
                .or_else(|| self.twilio.base_url.clone()),
        }
    }
}

impl From<TwilioCredentials> for CredentialProfile {
    fn from(twilio: TwilioCredentials) -> Self {
        Self {
            twilio,
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for CredentialProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProfile")
            .field("twilio", &self.credentials())
            .finish()
    }
}

#[derive(Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct TwilioCredentials {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Overrides the API endpoint for this profile only.
    pub base_url: Option<String>,
}

impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<REDACTED>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// The host's "get config option by name" lookup.
///
/// `Ok(None)` means no option with that name exists.
pub trait ConfigSource: Send + Sync {
    fn option(&self, name: &str) -> Result<Option<CredentialProfile>, ConfigError>;
}

/// [`ConfigSource`] over the layered application configuration.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    config: Config,
}

impl ProfileStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn load(extra: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(layered(extra)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ConfigSource for ProfileStore {
    fn option(&self, name: &str) -> Result<Option<CredentialProfile>, ConfigError> {
        match self.config.get::<CredentialProfile>(name) {
            Ok(profile) => Ok(Some(profile)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl ConfigSource for HashMap<String, CredentialProfile> {
    fn option(&self, name: &str) -> Result<Option<CredentialProfile>, ConfigError> {
        Ok(self.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn store(toml: &str) -> ProfileStore {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        ProfileStore::new(config)
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.twilio.api_shape, ApiShape::Current);
    }

    #[test]
    fn app_config_reads_shape() {
        let config = Config::builder()
            .add_source(File::from_str(
                "[twilio]\napi_shape = \"legacy\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let app = AppConfig::from_config(&config).unwrap();
        assert_eq!(app.twilio.api_shape, ApiShape::Legacy);
        assert_eq!(app.logging.level, "info");
    }

    #[test]
    fn resolves_named_profile() {
        let store = store(
            r#"
            [my-twilio-account.twilio]
            account_sid = "AC32a3c83990934481addd5ce1659f04d2"
            auth_token = "mytoken"
            "#,
        );
        let creds = store.option("my-twilio-account").unwrap().unwrap().credentials();
        assert_eq!(
            creds.account_sid.as_deref(),
            Some("AC32a3c83990934481addd5ce1659f04d2")
        );
        assert_eq!(creds.auth_token.as_deref(), Some("mytoken"));
        assert!(creds.base_url.is_none());
    }

    #[test]
    fn resolves_flat_dotted_profile() {
        let config = Config::builder()
            .add_source(File::from_str(
                "my-twilio-account:\n  twilio.account_sid: AC32\n  twilio.auth_token: mytoken\n",
                FileFormat::Yaml,
            ))
            .build()
            .unwrap();
        let store = ProfileStore::new(config);
        let creds = store.option("my-twilio-account").unwrap().unwrap().credentials();
        assert_eq!(creds.account_sid.as_deref(), Some("AC32"));
        assert_eq!(creds.auth_token.as_deref(), Some("mytoken"));
        assert!(creds.base_url.is_none());
    }

    #[test]
    fn flat_keys_override_nested_table() {
        let store = store(
            r#"
            [mixed]
            "twilio.auth_token" = "flat-token"

            [mixed.twilio]
            account_sid = "AC1"
            auth_token = "nested-token"
            "#,
        );
        let creds = store.option("mixed").unwrap().unwrap().credentials();
        assert_eq!(creds.account_sid.as_deref(), Some("AC1"));
        assert_eq!(creds.auth_token.as_deref(), Some("flat-token"));
    }

    #[test]
    fn missing_fields_are_none() {
        let store = store(
            r#"
            [partial.twilio]
            account_sid = "AC1"
            "#,
        );
        let creds = store.option("partial").unwrap().unwrap().credentials();
        assert_eq!(creds.account_sid.as_deref(), Some("AC1"));
        assert!(creds.auth_token.is_none());
    }

    #[test]
    fn unknown_profile_is_none() {
        let store = store("[other.twilio]\naccount_sid = \"AC1\"\n");
        assert!(store.option("nope").unwrap().is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let creds = TwilioCredentials {
            account_sid: Some("AC1".into()),
            auth_token: Some("hunter2".into()),
            base_url: None,
        };
        let out = format!("{:?}", creds);
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<REDACTED>"));

        let profile = format!("{:?}", CredentialProfile::from(creds));
        assert!(!profile.contains("hunter2"));
    }
}
