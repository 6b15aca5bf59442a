//! HTTP boundary
//!
//! `POST /convert` takes a multipart form with a `file` part and answers
//! with a [`ConvertResponse`]. Each conversion runs on the blocking pool
//! under the configured deadline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::{ConvertError, UploadError};
use crate::pipeline::Pipeline;
use crate::service::{ConvertResponse, ConvertService};
use crate::upload::{Upload, UploadRoot};

/// Multipart part carrying the image
pub const FILE_FIELD: &str = "file";

// AppState is shared by every handler; nothing in it is mutated after startup
pub struct AppState {
    pub service: Arc<ConvertService>,
    pub timeout: Duration,
}

impl AppState {
    pub fn new(service: ConvertService, timeout: Duration) -> Self {
        Self {
            service: Arc::new(service),
            timeout,
        }
    }
}

pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/convert", post(convert))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ConvertResponse>) {
    let result = match multipart {
        // A body that is not multipart carries no file part at all
        Err(_) => Err(UploadError::MissingFile.into()),
        Ok(multipart) => match read_upload(multipart).await {
            Ok(upload) => run_conversion(&state, upload).await,
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = &result {
        warn!("convert request failed: {}", e);
    }
    let (status, body) = ConvertResponse::from_result(&result);
    (status, Json(body))
}

/// Pull the `file` part out of the form
///
/// Parts without a filename are plain form fields and do not count as an
/// upload. A file part with an empty filename is passed on so the service
/// can reject it.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?;
        return Ok(Some(Upload::new(filename, bytes.to_vec())));
    }
    Ok(None)
}

async fn run_conversion(state: &AppState, upload: Option<Upload>) -> Result<String, ConvertError> {
    let service = Arc::clone(&state.service);
    let task = tokio::task::spawn_blocking(move || service.convert(upload));

    match tokio::time::timeout(state.timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ConvertError::Internal(join_error.to_string())),
        // The blocking task keeps running and drops its workspace when done
        Err(_) => Err(ConvertError::Timeout(state.timeout)),
    }
}

/// Bind, serve until Ctrl-C, then remove the upload root if it was ours
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let root = UploadRoot::create(config.upload_dir.as_deref())
        .context("Failed to prepare upload directory")?;
    info!(
        upload_dir = %root.path().display(),
        owned = root.is_owned(),
        "upload root ready"
    );

    let service = ConvertService::new(root, Pipeline::new(config.conversion.clone()));
    let state = Arc::new(AppState::new(service, config.request_timeout()));
    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
