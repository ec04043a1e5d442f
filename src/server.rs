//! Tutorial generator HTTP server.
//!
//! Exposes the generation dispatcher as a small JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/generate` | Run the generator for a repository or local directory |
//! | `GET`  | `/` | Health check |
//!
//! # Error Contract
//!
//! Client errors (400) and server errors (500) share one shape:
//!
//! ```json
//! {
//!   "error": "Script execution failed.",
//!   "details": "The tutorial generation script exited with an error.",
//!   "return_code": 1,
//!   "script_stdout": "...",
//!   "script_stderr": "..."
//! }
//! ```
//!
//! `return_code`, `script_stdout` and `script_stderr` are only present when
//! the script actually ran and failed.
//!
//! # CORS
//!
//! Only the origins listed in `[server].cors_origins` are allowed. For those,
//! any method and header is accepted and credentials are permitted.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::GenerateError;
use crate::generate::generate;
use crate::models::{GenerationOutcome, GenerationRequest};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Starts the HTTP server.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(Arc::new(config.clone()))?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("tutorial generator API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router with CORS and request tracing applied.
///
/// Fails if a configured CORS origin is not a valid header value.
pub fn router(config: Arc<Config>) -> anyhow::Result<Router> {
    let cors = cors_layer(&config.server.cors_origins)?;

    Ok(Router::new()
        .route("/generate", post(handle_generate))
        .route("/", get(handle_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { config }))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: '{}'", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Credentials rule out wildcards, so methods and headers are mirrored.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

// ============ Error response ============

/// JSON error body shared by 400 and 500 responses.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_stderr: Option<String>,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    body: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn simple(status: StatusCode, error: &str, details: String) -> AppError {
    AppError {
        status,
        body: ErrorBody {
            error: error.to_string(),
            details,
            return_code: None,
            script_stdout: None,
            script_stderr: None,
        },
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(details: impl Into<String>) -> AppError {
    simple(StatusCode::BAD_REQUEST, "Invalid request.", details.into())
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::ClientInput(msg) => bad_request(msg),
            GenerateError::ProcessExecution {
                return_code,
                stdout,
                stderr,
            } => AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorBody {
                    error: "Script execution failed.".to_string(),
                    details: "The tutorial generation script exited with an error.".to_string(),
                    return_code: Some(return_code),
                    script_stdout: Some(stdout),
                    script_stderr: Some(stderr),
                },
            },
            GenerateError::Configuration(msg) => simple(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error.",
                msg,
            ),
            GenerateError::Internal(msg) => simple(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal server error occurred.",
                msg,
            ),
        }
    }
}

// ============ GET / ============

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Tutorial Generator API is running.",
    })
}

// ============ POST /generate ============

/// Handler for `POST /generate`.
///
/// Returns `400` for a malformed body, a missing or conflicting source, or a
/// name that cannot be derived; `500` when the generator cannot be started
/// or exits non-zero.
async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "rejected generation request body");
        bad_request(rejection.body_text())
    })?;

    let outcome = generate(&state.config.generator, request)
        .await
        .map_err(|err| {
            if let GenerateError::ClientInput(msg) = &err {
                tracing::warn!(error = %msg, "invalid generation request");
            }
            AppError::from(err)
        })?;

    Ok(Json(outcome))
}
