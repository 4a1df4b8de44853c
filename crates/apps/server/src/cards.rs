//! Destination card list: remote table or the built-in catalog.

use std::sync::Arc;
use std::time::Duration;

use catalog::{DestinationCard, DestinationCatalog};

use crate::error::UpstreamError;
use crate::BoxFuture;

pub trait CardSource: Send + Sync {
    fn cards(&self) -> BoxFuture<'_, Result<Vec<DestinationCard>, UpstreamError>>;
}

/// Cards derived from the built-in destination table.
pub struct CatalogCards {
    catalog: Arc<DestinationCatalog>,
}

impl CatalogCards {
    pub fn new(catalog: Arc<DestinationCatalog>) -> Self {
        Self { catalog }
    }
}

impl CardSource for CatalogCards {
    fn cards(&self) -> BoxFuture<'_, Result<Vec<DestinationCard>, UpstreamError>> {
        Box::pin(async move { Ok(self.catalog.cards()) })
    }
}

/// PostgREST-style read of the `destination_card` table.
pub struct SupabaseCards {
    client: reqwest::Client,
    endpoint: String,
    anon_key: String,
    timeout: Duration,
}

impl SupabaseCards {
    pub fn new(client: reqwest::Client, url: &str, anon_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/rest/v1/destination_card?select=*",
                url.trim_end_matches('/')
            ),
            anon_key: anon_key.into(),
            timeout,
        }
    }

    async fn fetch(&self) -> Result<Vec<DestinationCard>, UpstreamError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: "card table read failed".to_string(),
            });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;
        parse_card_rows(&body)
    }
}

impl CardSource for SupabaseCards {
    fn cards(&self) -> BoxFuture<'_, Result<Vec<DestinationCard>, UpstreamError>> {
        Box::pin(self.fetch())
    }
}

pub fn parse_card_rows(body: &[u8]) -> Result<Vec<DestinationCard>, UpstreamError> {
    serde_json::from_slice(body).map_err(|e| UpstreamError::Malformed(e.to_string()))
}
