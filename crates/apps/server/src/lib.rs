//! CultureVerse relay server.
//!
//! Bridges studio prompts to the image generation service and re-hosts the result, and
//! serves the destination card list and destination detail records.

pub mod cards;
pub mod config;
pub mod error;
pub mod generation;
pub mod hosting;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use catalog::{DestinationCard, DestinationCatalog, DestinationDetail};
use serde_json::json;
use studio::{RelayRequest, RelaySuccess, RELAY_PATH, RESULT_MIME_TYPE};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::cards::{CardSource, CatalogCards, SupabaseCards};
use crate::config::Config;
use crate::error::{RelayError, UpstreamError};
use crate::generation::{ImageGenerator, ImageRouterClient};
use crate::hosting::{CloudinaryHost, ImageHost};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Clone)]
pub struct AppState {
    /// `None` when the generation key is not configured.
    pub generator: Option<Arc<dyn ImageGenerator>>,
    /// `None` unless all three hosting credentials are configured.
    pub host: Option<Arc<dyn ImageHost>>,
    pub cards: Arc<dyn CardSource>,
    pub catalog: Arc<DestinationCatalog>,
    pub generation_timeout: Duration,
    pub hosting_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &Config, catalog: Arc<DestinationCatalog>) -> Self {
        let http = reqwest::Client::new();

        let generator = config.generation.api_key.as_ref().map(|key| {
            Arc::new(ImageRouterClient::new(
                http.clone(),
                &config.generation.base_url,
                key.clone(),
                config.generation.model.clone(),
                config.generation.timeout,
            )) as Arc<dyn ImageGenerator>
        });

        let host = config.hosting.credentials().map(|creds| {
            Arc::new(CloudinaryHost::new(
                http.clone(),
                &config.hosting.base_url,
                creds,
                config.hosting.folder.clone(),
                config.hosting.timeout,
            )) as Arc<dyn ImageHost>
        });

        let cards: Arc<dyn CardSource> = match &config.cards {
            Some(table) => Arc::new(SupabaseCards::new(
                http.clone(),
                &table.url,
                table.anon_key.clone(),
                table.timeout,
            )),
            None => Arc::new(CatalogCards::new(catalog.clone())),
        };

        Self {
            generator,
            host,
            cards,
            catalog,
            generation_timeout: config.generation.timeout,
            hosting_timeout: config.hosting.timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            RELAY_PATH,
            get(get_image_generation).post(post_image_generation),
        )
        .route("/api/destination-card", get(get_destination_cards))
        .route("/api/destinations/:slug", get(get_destination))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_image_generation() -> Response {
    Json(json!({
        "message": "Image generation API is running",
        "endpoint": RELAY_PATH,
        "method": "POST",
        "body": { "prompt": "your prompt here" },
    }))
    .into_response()
}

async fn post_image_generation(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelaySuccess>, RelayError> {
    let Json(request) = payload.map_err(|e| RelayError::InvalidBody(e.body_text()))?;
    let prompt = request.prompt;
    if prompt.trim().is_empty() {
        return Err(RelayError::MissingPrompt);
    }

    let generator = state
        .generator
        .as_ref()
        .ok_or(RelayError::NotConfigured("IMAGEROUTER_API_KEY"))?;
    let host = state
        .host
        .as_ref()
        .ok_or(RelayError::NotConfigured("Cloudinary"))?;

    info!("generating image ({} prompt chars)", prompt.len());
    let generated = bounded(generator.generate(&prompt), state.generation_timeout)
        .await
        .map_err(|e| {
            error!("generation failed: {e}");
            RelayError::Generation(e)
        })?
        .ok_or_else(|| {
            error!("generation succeeded without an image url");
            RelayError::NoImage
        })?;

    info!("image generated, uploading to hosting");
    let hosted = bounded(host.upload(&generated), state.hosting_timeout)
        .await
        .map_err(|e| {
            error!("hosting upload failed: {e}");
            RelayError::Hosting(e)
        })?;

    info!("image hosted as {}", hosted.public_id);
    Ok(Json(RelaySuccess {
        success: true,
        image_url: hosted.url,
        host_id: hosted.public_id,
        mime_type: RESULT_MIME_TYPE.to_string(),
    }))
}

async fn get_destination_cards(
    State(state): State<AppState>,
) -> Result<Json<Vec<DestinationCard>>, RelayError> {
    state.cards.cards().await.map(Json).map_err(|e| {
        error!("failed to read destination cards: {e}");
        RelayError::Cards(e)
    })
}

async fn get_destination(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
) -> Result<Json<DestinationDetail>, RelayError> {
    state
        .catalog
        .detail(&slug)
        .map(Json)
        .map_err(|_| RelayError::DestinationNotFound)
}

/// Bounds an upstream call; expiry becomes [`UpstreamError::Timeout`].
async fn bounded<T>(
    fut: impl Future<Output = Result<T, UpstreamError>>,
    limit: Duration,
) -> Result<T, UpstreamError> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(UpstreamError::Timeout(limit.as_millis() as u64)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosting::HostedImage;
    use axum::body::Body;
    use http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    enum GenReply {
        Url(&'static str),
        Empty,
        Fail(UpstreamError),
        Hang,
    }

    struct FakeGenerator {
        reply: GenReply,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn new(reply: GenReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl ImageGenerator for FakeGenerator {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
        ) -> BoxFuture<'a, Result<Option<String>, UpstreamError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.prompts.lock().unwrap().push(prompt.to_string());
                match &self.reply {
                    GenReply::Url(u) => Ok(Some(u.to_string())),
                    GenReply::Empty => Ok(None),
                    GenReply::Fail(e) => Err(e.clone()),
                    GenReply::Hang => std::future::pending().await,
                }
            })
        }
    }

    #[derive(Default)]
    struct FakeHost {
        uploads: Mutex<Vec<String>>,
        fail: Option<UpstreamError>,
    }

    impl FakeHost {
        fn failing(err: UpstreamError) -> Arc<Self> {
            Arc::new(Self {
                fail: Some(err),
                ..Self::default()
            })
        }
    }

    impl ImageHost for FakeHost {
        fn upload<'a>(
            &'a self,
            image_url: &'a str,
        ) -> BoxFuture<'a, Result<HostedImage, UpstreamError>> {
            Box::pin(async move {
                self.uploads.lock().unwrap().push(image_url.to_string());
                if let Some(err) = &self.fail {
                    return Err(err.clone());
                }
                Ok(HostedImage {
                    url: "https://res.example/cultureverse/batik-generations/abc.png".to_string(),
                    public_id: "cultureverse/batik-generations/abc".to_string(),
                })
            })
        }
    }

    struct BrokenCards;

    impl CardSource for BrokenCards {
        fn cards(&self) -> BoxFuture<'_, Result<Vec<DestinationCard>, UpstreamError>> {
            Box::pin(async {
                Err(UpstreamError::Status {
                    status: 503,
                    message: "down".to_string(),
                })
            })
        }
    }

    fn state(
        generator: Option<Arc<FakeGenerator>>,
        host: Option<Arc<FakeHost>>,
    ) -> AppState {
        let catalog = Arc::new(DestinationCatalog::builtin().unwrap());
        AppState {
            generator: generator.map(|g| g as Arc<dyn ImageGenerator>),
            host: host.map(|h| h as Arc<dyn ImageHost>),
            cards: Arc::new(CatalogCards::new(catalog.clone())),
            catalog,
            generation_timeout: Duration::from_secs(60),
            hosting_timeout: Duration::from_secs(30),
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post(RELAY_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_upstream_calls() {
        let generator = FakeGenerator::new(GenReply::Url("https://gen/a.png"));
        let host = Arc::new(FakeHost::default());
        let app = router(state(Some(generator.clone()), Some(host.clone())));

        for body in [r#"{"prompt":""}"#, r#"{"prompt":"   "}"#, "{}"] {
            let (status, value) = send(app.clone(), post_json(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value, json!({ "error": "Prompt is required" }));
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_client_error() {
        let app = router(state(None, None));
        let (status, value) = send(app, post_json("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn missing_hosting_credentials_fail_before_generation() {
        let generator = FakeGenerator::new(GenReply::Url("https://gen/a.png"));
        let app = router(state(Some(generator.clone()), None));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({ "error": "Cloudinary not configured" }));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_generation_key_fails_closed() {
        let host = Arc::new(FakeHost::default());
        let app = router(state(None, Some(host.clone())));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({ "error": "IMAGEROUTER_API_KEY not configured" }));
        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reply_without_image_is_server_error() {
        let generator = FakeGenerator::new(GenReply::Empty);
        let host = Arc::new(FakeHost::default());
        let app = router(state(Some(generator.clone()), Some(host.clone())));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(value, json!({ "error": "No image generated" }));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_error_message_is_passed_through() {
        let generator = FakeGenerator::new(GenReply::Fail(UpstreamError::Status {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        }));
        let app = router(state(Some(generator), Some(Arc::new(FakeHost::default()))));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            value,
            json!({ "error": "ImageRouter API error", "details": "Rate limit exceeded" })
        );
    }

    #[tokio::test]
    async fn malformed_generation_reply_is_bad_gateway() {
        let generator = FakeGenerator::new(GenReply::Fail(UpstreamError::Malformed(
            "expected value at line 1".to_string(),
        )));
        let host = Arc::new(FakeHost::default());
        let app = router(state(Some(generator), Some(host.clone())));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(value["error"], "ImageRouter API error");
        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generation_transport_failure_is_bad_gateway() {
        let generator = FakeGenerator::new(GenReply::Fail(UpstreamError::Transport(
            "connection refused".to_string(),
        )));
        let app = router(state(Some(generator), Some(Arc::new(FakeHost::default()))));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(value["error"], "ImageRouter API error");
    }

    #[tokio::test]
    async fn rejected_upload_is_bad_gateway() {
        let generator = FakeGenerator::new(GenReply::Url("https://gen/tmp/a.png"));
        let host = FakeHost::failing(UpstreamError::Status {
            status: 401,
            message: "Invalid Signature".to_string(),
        });
        let app = router(state(Some(generator.clone()), Some(host.clone())));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            value,
            json!({ "error": "Failed to upload image", "details": "Invalid Signature" })
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            host.uploads.lock().unwrap().as_slice(),
            ["https://gen/tmp/a.png".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_times_out() {
        let generator = FakeGenerator::new(GenReply::Hang);
        let app = router(state(Some(generator), Some(Arc::new(FakeHost::default()))));
        let (status, value) = send(app, post_json(r#"{"prompt":"x"}"#)).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(value["error"], "ImageRouter API error");
    }

    #[tokio::test]
    async fn generation_is_rehosted() {
        let generator = FakeGenerator::new(GenReply::Url("https://gen/tmp/a.png"));
        let host = Arc::new(FakeHost::default());
        let app = router(state(Some(generator.clone()), Some(host.clone())));

        let prompt = studio::expand_prompt("blue ocean batik", studio::GarmentCategory::Kebaya);
        let body = serde_json::to_string(&RelayRequest {
            prompt: prompt.clone(),
        })
        .unwrap();
        let (status, value) = send(app, post_json(&body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({
                "success": true,
                "imageUrl": "https://res.example/cultureverse/batik-generations/abc.png",
                "hostId": "cultureverse/batik-generations/abc",
                "mimeType": "image/png",
            })
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(generator.prompts.lock().unwrap().as_slice(), [prompt]);
        assert_eq!(
            host.uploads.lock().unwrap().as_slice(),
            ["https://gen/tmp/a.png".to_string()]
        );
    }

    #[tokio::test]
    async fn usage_endpoint_describes_post() {
        let (status, value) = send(router(state(None, None)), get(RELAY_PATH)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["method"], "POST");
        assert_eq!(value["endpoint"], RELAY_PATH);
    }

    #[tokio::test]
    async fn card_list_falls_back_to_catalog() {
        let (status, value) = send(router(state(None, None)), get("/api/destination-card")).await;
        assert_eq!(status, StatusCode::OK);
        let cards = value.as_array().unwrap();
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0]["id"], "borobudur");
        assert!(cards[0]["imageUrl"].is_string());
    }

    #[tokio::test]
    async fn card_backend_failure_is_500() {
        let mut s = state(None, None);
        s.cards = Arc::new(BrokenCards);
        let (status, value) = send(router(s), get("/api/destination-card")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["error"], "Error fetching data");
    }

    #[tokio::test]
    async fn destination_detail_and_not_found() {
        let app = router(state(None, None));
        let (status, value) = send(app.clone(), get("/api/destinations/borobudur")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["id"], "borobudur");
        assert!(!value["hotspots"].as_array().unwrap().is_empty());

        let (status, value) = send(app, get("/api/destinations/atlantis")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({ "error": "Destination not found" }));
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (status, value) = send(router(state(None, None)), get("/healthz")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, Value::String("ok".to_string()));
    }
}
