//! Request transport.
//!
//! A [`Transport`] takes an action name and its encoded parameters, delivers
//! them to the service and hands back the raw XML of a successful response.
//! Non-success responses are decoded into call-level errors here, so the
//! client only ever sees success documents.

use crate::config::ClientConfig;
use crate::error::SqsError;
use crate::protocol::signer::FORM_CONTENT_TYPE;
use crate::protocol::{xml, AwsV4Signer, QueryParams};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client as HttpClient;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

/// Delivers one encoded request to the queue service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `action` with `params` and return the body of a 2xx response
    async fn send(&self, action: &str, params: QueryParams) -> Result<String, SqsError>;
}

/// HTTP transport: form-encoded `POST` signed with Signature V4
pub struct HttpTransport {
    http_client: HttpClient,
    signer: Option<AwsV4Signer>,
    endpoint: Url,
    host: String,
    api_version: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, SqsError> {
        config.validate()?;

        let endpoint = Url::parse(&config.endpoint_url()).map_err(|e| {
            SqsError::Configuration(crate::error::ConfigurationError::Invalid {
                message: format!("Invalid endpoint '{}': {}", config.endpoint_url(), e),
            })
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(SqsError::Configuration(
                    crate::error::ConfigurationError::Invalid {
                        message: format!("Endpoint '{}' has no host", endpoint),
                    },
                ))
            }
        };

        let signer = config.credentials.as_ref().and_then(|creds| {
            let access_key = creds.access_key_id.as_ref().filter(|k| !k.is_empty());
            let secret_key = creds.secret_access_key.as_ref().filter(|k| !k.is_empty());
            match (access_key, secret_key) {
                (Some(access_key), Some(secret_key)) => Some(
                    AwsV4Signer::new(access_key.clone(), secret_key.clone(), config.region.clone())
                        .with_session_token(creds.session_token.clone()),
                ),
                _ => None,
            }
        });

        let timeout = config.request_timeout();
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SqsError::Network {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            signer,
            endpoint,
            host,
            api_version: config.api_version.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_version", &self.api_version)
            .field("signed", &self.signer.is_some())
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, action: &str, mut params: QueryParams) -> Result<String, SqsError> {
        let signer = self.signer.as_ref().ok_or_else(|| SqsError::AuthenticationFailed {
            message: "No credentials configured".to_string(),
        })?;

        params.insert("Action", action);
        params.insert("Version", self.api_version.as_str());
        let body = params.to_form_body();

        let headers = signer.sign_request(&self.host, self.endpoint.path(), &body, &Utc::now());

        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE);
        for (name, value) in headers {
            if name != "content-type" {
                request = request.header(name, value);
            }
        }

        debug!(action, endpoint = %self.endpoint, bytes = body.len(), "Sending request");

        let response = request.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                SqsError::Timeout {
                    duration: self.timeout,
                }
            } else if e.is_connect() {
                SqsError::Network {
                    message: format!("Connection failed: {}", e),
                }
            } else {
                SqsError::Network {
                    message: format!("HTTP request failed: {}", e),
                }
            }
        })?;

        let status = response.status();
        let response_body = response.text().await.map_err(|e| SqsError::Network {
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            let error = xml::decode_error(status.as_u16(), &response_body);
            warn!(action, status = status.as_u16(), error = %error, "Request rejected by service");
            return Err(error);
        }

        Ok(response_body)
    }
}

/// Race `operation` against a cancellation signal
///
/// Sending on (not dropping) the paired sender cancels the call with
/// [`SqsError::Cancelled`]. The in-flight request future is dropped.
pub async fn with_cancellation<T, F>(
    operation: F,
    cancel: oneshot::Receiver<()>,
) -> Result<T, SqsError>
where
    F: Future<Output = Result<T, SqsError>>,
{
    tokio::select! {
        result = operation => result,
        Ok(()) = cancel => Err(SqsError::Cancelled),
    }
}
