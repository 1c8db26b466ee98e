//! Collector routes: snapshot uploads and the question label.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chalkgrid_core::sync::{IMAGE_ENDPOINT, IMAGE_FIELD, IMAGE_FILENAME, QUESTION_ENDPOINT};
use chalkgrid_core::QuestionLabel;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Prefix of stored upload file names.
const UPLOAD_PREFIX: &str = "uploaded_";

/// Server configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub addr: SocketAddr,
    /// Directory uploads are written to.
    pub upload_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            upload_dir: PathBuf::from("."),
        }
    }
}

impl CollectorConfig {
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }
}

/// Request failures, mapped onto HTTP statuses.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Error parsing form: {0}")]
    Form(#[from] MultipartError),
    #[error("Missing form field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
    #[error("Question must not be blank")]
    BlankQuestion,
    #[error("Error saving file: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectorError {
    fn status(&self) -> StatusCode {
        match self {
            // Oversized bodies surface here as 413
            CollectorError::Form(e) => e.status(),
            CollectorError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for CollectorError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Shared application state
pub struct CollectorState {
    config: CollectorConfig,
    question: RwLock<Option<QuestionLabel>>,
}

impl CollectorState {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            question: RwLock::new(None),
        }
    }

    /// Where an upload with the given client file name is stored.
    fn upload_path(&self, file_name: Option<&str>) -> PathBuf {
        // Only the last path component of the client name is used
        let name = file_name
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or(IMAGE_FILENAME);
        self.config
            .upload_dir
            .join(format!("{}{}", UPLOAD_PREFIX, name))
    }
}

/// Body of a question update, and of `GET /question`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBody {
    pub question: Option<String>,
}

/// Build the collector router.
pub fn router(state: Arc<CollectorState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(IMAGE_ENDPOINT, post(upload_image))
        .route(QUESTION_ENDPOINT, post(set_question))
        .route("/question", get(get_question))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "chalkgrid collector - POST snapshots to /image and questions to /setQuestion"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Store the `image` field of a multipart upload.
async fn upload_image(
    State(state): State<Arc<CollectorState>>,
    mut multipart: Multipart,
) -> Result<String, CollectorError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let path = state.upload_path(field.file_name());
        let bytes = field.bytes().await?;
        tokio::fs::write(&path, &bytes).await?;

        info!("Stored {} bytes at {}", bytes.len(), path.display());
        return Ok(format!("Image uploaded successfully: {}", path.display()));
    }
    Err(CollectorError::MissingField(IMAGE_FIELD))
}

/// Replace the current question.
async fn set_question(
    State(state): State<Arc<CollectorState>>,
    body: Result<Json<QuestionBody>, JsonRejection>,
) -> Result<Json<QuestionBody>, CollectorError> {
    let Json(body) = body?;
    let label = body
        .question
        .as_deref()
        .and_then(QuestionLabel::parse)
        .ok_or(CollectorError::BlankQuestion)?;

    info!("Question set: {}", label);
    let question = Some(label.to_string());
    *state.question.write().await = Some(label);
    Ok(Json(QuestionBody { question }))
}

/// Current question, or `null` if none was set.
async fn get_question(State(state): State<Arc<CollectorState>>) -> Json<QuestionBody> {
    let question = state.question.read().await.as_ref().map(|q| q.to_string());
    Json(QuestionBody { question })
}
