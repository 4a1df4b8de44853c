use std::time::Duration;

use assets::BoxFuture;
use tracing::{debug, warn};

use crate::protocol::{ErrorBody, RELAY_PATH, RelayRequest, RelaySuccess};
use crate::session::{FailureNotice, GenerationResult};

/// Default bound on one relay round trip. The relay itself bounds generation and hosting.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayClientError {
    /// The relay answered with a non-success status.
    #[error("relay rejected the request ({status}): {error}")]
    Rejected {
        status: u16,
        error: String,
        details: Option<String>,
    },
    /// A success status whose body does not carry a usable image URL.
    #[error("relay response has no image: {0}")]
    MissingImage(String),
    #[error("relay response is not valid JSON: {0}")]
    Malformed(String),
    #[error("relay request failed: {0}")]
    Transport(String),
    #[error("relay request timed out after {0} ms")]
    Timeout(u64),
}

impl RelayClientError {
    /// Notice shown to the user for this failure.
    pub fn notice(&self) -> FailureNotice {
        match self {
            Self::Rejected { .. } | Self::MissingImage(_) => FailureNotice::Rejected,
            Self::Malformed(_) | Self::Transport(_) | Self::Timeout(_) => FailureNotice::Transport,
        }
    }
}

/// Submits expanded prompts to the relay endpoint.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait RelayClient: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> BoxFuture<'a, Result<GenerationResult, RelayClientError>>;
}

/// Runs `client` with an upper bound on wall time.
pub async fn generate_with_timeout(
    client: &dyn RelayClient,
    request: &RelayRequest,
    timeout: Duration,
) -> Result<GenerationResult, RelayClientError> {
    match tokio::time::timeout(timeout, client.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(RelayClientError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Relay client over HTTP.
pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpRelayClient {
    /// `base_url` is the relay origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, DEFAULT_RELAY_TIMEOUT)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: format!("{}{RELAY_PATH}", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &RelayRequest) -> Result<GenerationResult, RelayClientError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayClientError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    RelayClientError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RelayClientError::Transport(e.to_string()))?;
        parse_relay_response(status.as_u16(), &body)
    }
}

impl RelayClient for HttpRelayClient {
    fn generate<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> BoxFuture<'a, Result<GenerationResult, RelayClientError>> {
        Box::pin(async move {
            debug!("POST {} ({} prompt chars)", self.endpoint, request.prompt.len());
            self.post(request).await
        })
    }
}

/// Interprets a relay reply. Only a 2xx with `success: true` and a non-empty
/// `imageUrl` is a result.
pub fn parse_relay_response(
    status: u16,
    body: &[u8],
) -> Result<GenerationResult, RelayClientError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| RelayClientError::Malformed(e.to_string()))?;

    if !(200..300).contains(&status) {
        let parsed: Option<ErrorBody> = serde_json::from_value(value).ok();
        let (error, details) = match parsed {
            Some(b) => (b.error, b.details),
            None => ("Unknown error".to_string(), None),
        };
        warn!("relay returned {status}: {error}");
        return Err(RelayClientError::Rejected {
            status,
            error,
            details,
        });
    }

    let success: RelaySuccess = serde_json::from_value(value)
        .map_err(|e| RelayClientError::MissingImage(e.to_string()))?;
    if !success.success || success.image_url.trim().is_empty() {
        return Err(RelayClientError::MissingImage(
            "success flag or imageUrl missing".to_string(),
        ));
    }
    Ok(GenerationResult::from(success))
}
