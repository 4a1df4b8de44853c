//! Durable image hosting (Cloudinary-style signed uploads).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::HostingCredentials;
use crate::error::UpstreamError;
use crate::BoxFuture;

/// Quality and format normalization requested for every upload.
pub const UPLOAD_TRANSFORMATION: &str = "q_auto/f_auto";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedImage {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
}

/// Copies a remote image into durable hosting.
pub trait ImageHost: Send + Sync {
    fn upload<'a>(&'a self, image_url: &'a str) -> BoxFuture<'a, Result<HostedImage, UpstreamError>>;
}

pub struct CloudinaryHost {
    client: reqwest::Client,
    endpoint: String,
    credentials: HostingCredentials,
    folder: String,
    timeout: Duration,
}

impl CloudinaryHost {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        credentials: HostingCredentials,
        folder: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/v1_1/{}/image/upload",
                base_url.trim_end_matches('/'),
                credentials.cloud_name
            ),
            credentials,
            folder: folder.into(),
            timeout,
        }
    }

    /// Form fields for a signed upload of `image_url` at `timestamp` (unix seconds).
    pub fn upload_form(&self, image_url: &str, timestamp: u64) -> Vec<(&'static str, String)> {
        let timestamp = timestamp.to_string();
        let signed = [
            ("folder", self.folder.as_str()),
            ("timestamp", timestamp.as_str()),
            ("transformation", UPLOAD_TRANSFORMATION),
        ];
        let signature = sign_params(&signed, &self.credentials.api_secret);
        vec![
            ("file", image_url.to_string()),
            ("folder", self.folder.clone()),
            ("transformation", UPLOAD_TRANSFORMATION.to_string()),
            ("timestamp", timestamp.clone()),
            ("api_key", self.credentials.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ]
    }

    async fn request(&self, image_url: &str) -> Result<HostedImage, UpstreamError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .form(&self.upload_form(image_url, timestamp))
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;
        parse_upload_reply(status.as_u16(), &body)
    }
}

impl ImageHost for CloudinaryHost {
    fn upload<'a>(&'a self, image_url: &'a str) -> BoxFuture<'a, Result<HostedImage, UpstreamError>> {
        Box::pin(self.request(image_url))
    }
}

/// Signs upload parameters: `k=v` pairs sorted by key, joined with `&`, secret appended,
/// SHA-256 hex digest.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let digest = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    format!("{digest:x}")
}

pub fn parse_upload_reply(status: u16, body: &[u8]) -> Result<HostedImage, UpstreamError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!("hosting service returned {status}: {message}");
        return Err(UpstreamError::Status { status, message });
    }
    serde_json::from_slice(body).map_err(|e| UpstreamError::Malformed(e.to_string()))
}
