use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::texture::{Texture, TextureError, decode_texture};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default bound for a single texture fetch + decode.
pub const DEFAULT_TEXTURE_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches and decodes an image by URL.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait TextureLoader: Send + Sync {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Texture, TextureError>>;
}

/// Runs `loader` with an upper bound on wall time. Expiry is reported as `TextureError::Timeout`.
pub async fn load_with_timeout(
    loader: &dyn TextureLoader,
    url: &str,
    timeout: Duration,
) -> Result<Texture, TextureError> {
    match tokio::time::timeout(timeout, loader.load(url)).await {
        Ok(result) => result,
        Err(_) => Err(TextureError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Identifies one issued texture load.
///
/// Owners bump their generation whenever the wanted URL changes; an outcome whose ticket
/// generation no longer matches is stale and must be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub url: String,
    pub generation: u64,
}

impl LoadTicket {
    pub fn new(url: impl Into<String>, generation: u64) -> Self {
        Self {
            url: url.into(),
            generation,
        }
    }

    /// Fetches and decodes the ticket's URL, bounded by `timeout`.
    pub async fn fetch(self, loader: &dyn TextureLoader, timeout: Duration) -> LoadOutcome {
        let result = load_with_timeout(loader, &self.url, timeout).await;
        LoadOutcome {
            ticket: self,
            result,
        }
    }
}

/// Completion of a [`LoadTicket`].
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<Texture, TextureError>,
}

/// HTTP(S) texture loader.
pub struct HttpTextureLoader {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTextureLoader {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_TEXTURE_TIMEOUT)
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TextureError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TextureError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    TextureError::Fetch(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(TextureError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TextureError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Default for HttpTextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLoader for HttpTextureLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Texture, TextureError>> {
        Box::pin(async move {
            let trimmed = url.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(TextureError::InvalidUrl(url.to_string()));
            }
            let bytes = self.fetch(trimmed).await?;
            debug!("fetched texture {trimmed} ({} bytes)", bytes.len());
            decode_texture(trimmed, &bytes)
        })
    }
}

/// In-memory texture loader for tests and offline runs.
#[derive(Default)]
pub struct MemoryTextureLoader {
    images: RwLock<HashMap<String, Vec<u8>>>,
    loads: AtomicUsize,
}

impl MemoryTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.write().await.insert(url.into(), bytes);
    }

    /// Number of `load` calls issued so far, including failed ones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl TextureLoader for MemoryTextureLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Texture, TextureError>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let images = self.images.read().await;
            let bytes = images
                .get(url)
                .ok_or_else(|| TextureError::NotFound(url.to_string()))?;
            decode_texture(url, bytes)
        })
    }
}
