use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::publish::Credentials;

pub const DEFAULT_MESSAGE_TEMPLATE: &str = "{category}: {title}\n#AppleNewsroom\n{link}";
pub const DEFAULT_PUBLISH_API_URL: &str = "https://api.twitter.com/2/tweets";

/// A configuration value that must never end up in logs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub log_level: String,
    pub database_url: String,
    pub database_pool_size: u32,
    pub feed_url: String,
    pub sync_interval: u64,
    pub request_timeout: u64,
    pub message_template: String,
    pub publish_api_url: String,
    #[serde(default)]
    pub consumer_key: Secret,
    #[serde(default)]
    pub consumer_secret: Secret,
    #[serde(default)]
    pub access_token: Secret,
    #[serde(default)]
    pub access_token_secret: Secret,
}

/// # Errors
///
/// Will return Err if a default cannot be recorded by the builder
pub fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("debug", false)?
        .set_default("log_level", "info")?
        .set_default("database_url", "feedrelay.sqlite")?
        .set_default("database_pool_size", 2)?
        .set_default("sync_interval", 60 * 60)?
        .set_default("request_timeout", 30)?
        .set_default("message_template", DEFAULT_MESSAGE_TEMPLATE)?
        .set_default("publish_api_url", DEFAULT_PUBLISH_API_URL)
}

impl Settings {
    /// # Errors
    ///
    /// Will return Err when a required key is missing or a value is unusable
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("feed_url", &self.feed_url),
            ("publish_api_url", &self.publish_api_url),
        ] {
            if let Err(error) = Url::parse(value) {
                return Err(ConfigError::Message(format!(
                    "{} is not a valid url ({}): {}",
                    key, value, error
                )));
            }
        }

        for (key, seconds) in [
            ("sync_interval", self.sync_interval),
            ("request_timeout", self.request_timeout),
        ] {
            if seconds == 0 {
                return Err(ConfigError::Message(format!(
                    "{} must be at least one second",
                    key
                )));
            }
        }
        if self.database_pool_size == 0 {
            return Err(ConfigError::Message(String::from(
                "database_pool_size must be at least 1",
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Credentials for posting. Only `run` needs them, so they are checked here
    /// rather than when the settings are loaded.
    ///
    /// # Errors
    ///
    /// Will return Err naming the first credential that is missing or blank
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        for (key, secret) in [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_token_secret),
        ] {
            if secret.expose().trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", key)));
            }
        }
        Ok(Credentials {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            access_token: self.access_token.clone(),
            access_token_secret: self.access_token_secret.clone(),
        })
    }
}
