//! Image generation service client (OpenAI-compatible images API).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::UpstreamError;
use crate::BoxFuture;

/// Turns a prompt into a (possibly short-lived) image URL.
///
/// Returns `Ok(None)` when the service answered successfully but produced no image.
pub trait ImageGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<Option<String>, UpstreamError>>;
}

#[derive(Debug, Serialize)]
struct GenerationBody<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationReply {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    url: Option<String>,
}

pub struct ImageRouterClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl ImageRouterClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/v1/openai/images/generations",
                base_url.trim_end_matches('/')
            ),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    async fn request(&self, prompt: &str) -> Result<Option<String>, UpstreamError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&GenerationBody {
                prompt,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;
        parse_generation_reply(status.as_u16(), &body)
    }
}

impl ImageGenerator for ImageRouterClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<Option<String>, UpstreamError>> {
        Box::pin(self.request(prompt))
    }
}

/// Extracts `data[0].url`, or the upstream `error.message` on failure.
pub fn parse_generation_reply(status: u16, body: &[u8]) -> Result<Option<String>, UpstreamError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!("generation service returned {status}: {message}");
        return Err(UpstreamError::Status { status, message });
    }

    let reply: GenerationReply =
        serde_json::from_slice(body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
    Ok(reply
        .data
        .into_iter()
        .next()
        .and_then(|img| img.url)
        .filter(|url| !url.trim().is_empty()))
}
