use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use studio::ErrorBody;

/// Failure talking to an upstream HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("upstream response malformed: {0}")]
    Malformed(String),
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream timed out after {0} ms")]
    Timeout(u64),
}

impl UpstreamError {
    pub fn from_reqwest(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout.as_millis() as u64)
        } else {
            Self::Transport(err.to_string())
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Relay request errors.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("{0} not configured")]
    NotConfigured(&'static str),
    #[error("generation failed: {0}")]
    Generation(UpstreamError),
    #[error("No image generated")]
    NoImage,
    #[error("hosting upload failed: {0}")]
    Hosting(UpstreamError),
    #[error("card table read failed: {0}")]
    Cards(UpstreamError),
    #[error("Destination not found")]
    DestinationNotFound,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingPrompt | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) | Self::Cards(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Generation(UpstreamError::Timeout(_)) | Self::Hosting(UpstreamError::Timeout(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            Self::Generation(_) | Self::NoImage | Self::Hosting(_) => StatusCode::BAD_GATEWAY,
            Self::DestinationNotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            Self::MissingPrompt | Self::NoImage | Self::DestinationNotFound => {
                ErrorBody::new(self.to_string())
            }
            Self::InvalidBody(reason) => ErrorBody::with_details("Invalid request body", reason),
            Self::NotConfigured(_) => ErrorBody::new(self.to_string()),
            Self::Generation(e) => ErrorBody::with_details("ImageRouter API error", e.detail()),
            Self::Hosting(e) => ErrorBody::with_details("Failed to upload image", e.detail()),
            Self::Cards(e) => ErrorBody::with_details("Error fetching data", e.detail()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.body())).into_response()
    }
}
