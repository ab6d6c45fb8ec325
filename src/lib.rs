//! Core library for Recap.  This module wires together content extraction,
//! prompt construction and the completion client behind a small Axum router.
//! Each request is handled independently; the shared state is read-only.

mod config;
pub mod completion;
pub mod error;
pub mod extract;
pub mod prompt;

pub use config::{AppConfig, DEFAULT_PORT, DEFAULT_SERVICE_NAME};

use axum::extract::{
    rejection::{BytesRejection, FailedToBufferBody, JsonRejection},
    DefaultBodyLimit, State,
};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

pub use crate::completion::{CompletionBackend, GroqClient};
pub use crate::error::{ErrorKind, SummarizeError};
pub use crate::extract::{extract_content, RichTextBlock, SummaryBody, SummaryRequest};
pub use crate::prompt::{PromptBuilder, PromptSpec};

/// Envelope error for any failure of the completion call.
pub const UPSTREAM_ERROR_MESSAGE: &str = "Groq API error";
/// Envelope error when no usable content was supplied.
pub const NO_CONTENT_MESSAGE: &str = "No content provided";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&SummarizeError> for ErrorResponse {
    fn from(err: &SummarizeError) -> Self {
        let error = match err.kind() {
            ErrorKind::NoContent => NO_CONTENT_MESSAGE,
            ErrorKind::UpstreamError
            | ErrorKind::MalformedUpstreamResponse
            | ErrorKind::TransportError => UPSTREAM_ERROR_MESSAGE,
        };
        ErrorResponse {
            error: error.to_string(),
            details: err.details(),
        }
    }
}

/// Application state shared across handlers.  Cloned per request; nothing in
/// here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub prompts: PromptBuilder,
    pub service_name: String,
    /// Maximum accepted raw request body size in bytes (None => unlimited)
    pub max_request_bytes: Option<usize>,
}

impl AppState {
    /// State around an arbitrary backend, with default prompt settings.
    pub fn with_backend(backend: Arc<dyn CompletionBackend>) -> Self {
        AppState {
            backend,
            prompts: PromptBuilder::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            max_request_bytes: None,
        }
    }
}

/// Build state from an explicit configuration.  The API key is moved into the
/// Groq client here and is not reachable from anywhere else.
pub fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let AppConfig {
        api_key,
        api_url,
        model,
        temperature,
        service_name,
        max_request_bytes,
        ..
    } = config;

    let client = GroqClient::new(api_key, api_url)?;
    tracing::info!(
        endpoint = %client.endpoint(),
        model = %model,
        "completion backend configured"
    );

    Ok(AppState {
        backend: Arc::new(client),
        prompts: PromptBuilder::new(model, temperature),
        service_name,
        max_request_bytes,
    })
}

/// Build state from environment variables.  See [`AppConfig::from_env`] for
/// the variables read.
pub async fn build_state_from_env() -> Result<AppState, Box<dyn std::error::Error>> {
    let config = AppConfig::from_env().map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;
    let state = build_state(config).map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;
    Ok(state)
}

/// Build the Axum router and attach handlers.
pub fn app(state: AppState) -> Router {
    let max_request_bytes = state.max_request_bytes;

    let router = Router::new()
        .route("/", get(home_handler))
        .route("/summarize", post(summarize_handler));

    // Without an explicit limit, bodies of any size reach the extractor.
    let router = match max_request_bytes {
        Some(limit) => router.layer(DefaultBodyLimit::max(limit)),
        None => router.layer(DefaultBodyLimit::disable()),
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Extract, build the prompt and call the backend.  The backend call is the
/// only suspension point.
pub async fn summarize(
    state: &AppState,
    request: SummaryRequest,
) -> Result<String, SummarizeError> {
    let (name, body) = request.into_parts();
    let content = extract_content(body)?;
    let prompt = state.prompts.build(name.as_deref(), content);
    state.backend.complete(prompt).await
}

fn respond_with_error(status: StatusCode, err: ErrorResponse) -> axum::response::Response {
    (status, Json(err)).into_response()
}

fn too_large(message: String) -> axum::response::Response {
    respond_with_error(
        StatusCode::PAYLOAD_TOO_LARGE,
        ErrorResponse {
            error: "Request too large".into(),
            details: Some(message),
        },
    )
}

/// Liveness route.
async fn home_handler(State(state): State<AppState>) -> axum::response::Response {
    let json = serde_json::json!({
        "status": format!("{} is running ✅", state.service_name),
    });
    (StatusCode::OK, Json(json)).into_response()
}

/// Handler for `/summarize`.  Failures are reported as a 200 with an error
/// envelope; only a body over the configured `max_request_bytes` changes the
/// status code.
async fn summarize_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> axum::response::Response {
    // Size guard: rely on Content-Length header if provided.
    if let Some(limit) = state.max_request_bytes {
        if let Some(len_header) = headers.get("content-length").and_then(|v| v.to_str().ok()) {
            if let Ok(clen) = len_header.parse::<usize>() {
                if clen > limit {
                    return too_large(format!(
                        "Request too large ({} bytes > limit {} bytes)",
                        clen, limit
                    ));
                }
            }
        }
    }

    let request = match payload {
        Ok(Json(inner)) => inner,
        Err(rejection) => return handle_json_rejection(&state, rejection),
    };

    let start = Instant::now();
    let outcome = summarize(&state, request).await;
    let latency_ms = start.elapsed().as_millis();
    match outcome {
        Ok(summary) => {
            tracing::info!(
                backend = state.backend.name(),
                outcome = "summary",
                latency_ms,
                summary_chars = summary.chars().count(),
                "summarize request completed"
            );
            (StatusCode::OK, Json(SummaryResponse { summary })).into_response()
        }
        Err(err) => {
            tracing::info!(
                backend = state.backend.name(),
                outcome = "error",
                error_kind = err.kind().as_str(),
                error = %err,
                latency_ms,
                "summarize request failed"
            );
            respond_with_error(StatusCode::OK, ErrorResponse::from(&err))
        }
    }
}

fn handle_json_rejection(state: &AppState, rejection: JsonRejection) -> axum::response::Response {
    match rejection {
        JsonRejection::BytesRejection(BytesRejection::FailedToBufferBody(
            FailedToBufferBody::LengthLimitError(_),
        )) => {
            // Only reachable with `max_request_bytes` set; otherwise the limit is disabled.
            tracing::warn!(
                limit = ?state.max_request_bytes,
                "request body exceeded configured limit"
            );
            let message = match state.max_request_bytes {
                Some(limit) => format!("Request too large (body exceeded limit {} bytes)", limit),
                None => "Request too large".to_string(),
            };
            too_large(message)
        }
        other => {
            // Unparsable or non-object bodies carry no recognised shape.
            tracing::debug!(rejection = %other, "unreadable summarize body");
            respond_with_error(
                StatusCode::OK,
                ErrorResponse::from(&SummarizeError::NoContent),
            )
        }
    }
}
