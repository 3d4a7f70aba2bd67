//! Client configuration.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults, with `AWS_REGION`, `AWS_ACCESS_KEY_ID`,
//!    `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN` taking the place of the
//!    default region and credentials when set
//! 2. An optional configuration file (format inferred from the extension)
//! 3. Environment variables prefixed `SQSX__`, with `__` separating nested
//!    keys, e.g. `SQSX__CREDENTIALS__ACCESS_KEY_ID`

use crate::batch::{MAX_BATCH_ENTRIES, MAX_BATCH_PAYLOAD_BYTES};
use crate::error::ConfigurationError;
use crate::protocol::API_VERSION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Prefix of environment variables read by [`ClientConfig::load`]
pub const ENV_PREFIX: &str = "SQSX";

/// Static credentials for request signing
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Settings for [`crate::SqsClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub region: String,
    /// Overrides `https://sqs.{region}.amazonaws.com`, e.g. for local emulators
    pub endpoint: Option<String>,
    pub credentials: Option<Credentials>,
    pub api_version: String,
    pub request_timeout_seconds: u64,
    /// Reject oversized batches locally instead of sending them
    pub enforce_batch_limits: bool,
    pub max_batch_entries: usize,
    pub max_batch_payload_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            credentials: None,
            api_version: API_VERSION.to_string(),
            request_timeout_seconds: 30,
            enforce_batch_limits: true,
            max_batch_entries: MAX_BATCH_ENTRIES,
            max_batch_payload_bytes: MAX_BATCH_PAYLOAD_BYTES,
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_with(path, &AwsEnvironment::from_env())
    }

    pub(crate) fn load_with(
        path: Option<&Path>,
        aws: &AwsEnvironment,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(region) = &aws.region {
            builder = builder
                .set_default("region", region.as_str())
                .map_err(parsing_error)?;
        }
        if let (Some(access_key), Some(secret_key)) = (&aws.access_key_id, &aws.secret_access_key) {
            builder = builder
                .set_default("credentials.access_key_id", access_key.as_str())
                .and_then(|b| b.set_default("credentials.secret_access_key", secret_key.as_str()))
                .map_err(parsing_error)?;
            if let Some(token) = &aws.session_token {
                builder = builder
                    .set_default("credentials.session_token", token.as_str())
                    .map_err(parsing_error)?;
            }
        }

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigurationError::Missing {
                    key: path.display().to_string(),
                });
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(parsing_error)?;

        let client_config: ClientConfig = config.try_deserialize().map_err(parsing_error)?;
        client_config.validate()?;
        Ok(client_config)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.region.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "region".to_string(),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid {
                message: "request_timeout_seconds must be greater than zero".to_string(),
            });
        }
        if self.max_batch_entries == 0 {
            return Err(ConfigurationError::Invalid {
                message: "max_batch_entries must be greater than zero".to_string(),
            });
        }
        if let Some(creds) = &self.credentials {
            let has_access_key = creds.access_key_id.as_deref().map_or(false, |k| !k.is_empty());
            let has_secret_key = creds
                .secret_access_key
                .as_deref()
                .map_or(false, |k| !k.is_empty());
            if has_access_key != has_secret_key {
                return Err(ConfigurationError::Invalid {
                    message: "credentials need both access_key_id and secret_access_key"
                        .to_string(),
                });
            }
        }
        Ok(())
    }

    /// Service endpoint, either the override or the regional default
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint.trim_end_matches('/').to_string(),
            _ => format!("https://sqs.{}.amazonaws.com", self.region),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            session_token: None,
        });
        self
    }
}

/// Conventional AWS environment variables used as fallbacks
#[derive(Debug, Clone, Default)]
pub(crate) struct AwsEnvironment {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl AwsEnvironment {
    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            region: var("AWS_REGION").or_else(|| var("AWS_DEFAULT_REGION")),
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            session_token: var("AWS_SESSION_TOKEN"),
        }
    }
}

fn parsing_error(e: config::ConfigError) -> ConfigurationError {
    ConfigurationError::Parsing {
        message: e.to_string(),
    }
}
