//! Web upload form and JSON API.

use crate::error::{AnalysisError, Result};
use crate::models::lab_result::AnalysisReport;
use crate::services::analyzer::{check_file_extension, Analyzer};
use crate::services::report_renderer::{render_page, PageContext, UploadedImage};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Multipart field carrying the report image
pub const UPLOAD_FIELD: &str = "report";

/// Application state shared across routes
#[derive(Clone)]
pub struct ServerState {
    pub analyzer: Analyzer,
    pub max_upload_bytes: usize,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(analyzer: Analyzer, max_upload_bytes: usize) -> Self {
        Self {
            analyzer,
            max_upload_bytes,
            started_at: Utc::now(),
        }
    }
}

/// Uploaded file pulled out of the multipart body
struct Upload {
    bytes: Vec<u8>,
    mime: &'static str,
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    engine: &'static str,
    engine_available: bool,
    uptime_seconds: i64,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the router; split out so tests can serve it on an ephemeral port
pub fn router(state: ServerState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze_form))
        .route("/api/analyze", post(analyze_api))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: ServerState) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Easylab listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Handler for `GET /`
async fn index() -> Html<String> {
    Html(render_page(&PageContext::default()))
}

/// Handler for `POST /analyze`: HTML results page
async fn analyze_form(State(state): State<ServerState>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart, state.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(e) => return error_page(&e, None),
    };

    match run_analysis(&state, upload.bytes.clone()).await {
        Ok(report) => {
            let page = render_page(&PageContext {
                report: Some(&report),
                image: Some(UploadedImage {
                    bytes: &upload.bytes,
                    mime: upload.mime,
                }),
                error: None,
            });
            Html(page).into_response()
        }
        Err(e) => error_page(&e, Some(&upload)),
    }
}

/// Handler for `POST /api/analyze`: JSON report
async fn analyze_api(State(state): State<ServerState>, multipart: Multipart) -> Response {
    let result = match read_upload(multipart, state.max_upload_bytes).await {
        Ok(upload) => run_analysis(&state, upload.bytes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => Json(report).into_response(),
        Err(e) => (
            status_for(&e),
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Handler for `GET /health`
async fn health(State(state): State<ServerState>) -> Json<HealthReport> {
    let engine = state.analyzer.engine().clone();
    let engine_available = tokio::task::spawn_blocking(move || engine.is_available())
        .await
        .unwrap_or(false);

    Json(HealthReport {
        status: "ok",
        engine: state.analyzer.engine().name(),
        engine_available,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        timestamp: Utc::now(),
    })
}

/// Run the blocking pipeline off the async workers
async fn run_analysis(state: &ServerState, bytes: Vec<u8>) -> Result<AnalysisReport> {
    let analyzer = state.analyzer.clone();
    let size = bytes.len();

    let report = tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&bytes))
        .await
        .map_err(|e| AnalysisError::ocr(format!("analysis task failed: {}", e)))??;

    info!(
        bytes = size,
        results = report.results.len(),
        "Upload analyzed"
    );
    Ok(report)
}

/// Pull the report file out of the multipart body
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if let Some(file_name) = field.file_name() {
            check_file_extension(file_name)?;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit))?
            .to_vec();

        if bytes.is_empty() {
            return Err(AnalysisError::invalid_upload("uploaded file is empty"));
        }

        let mime = match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::Jpeg) => "image/jpeg",
            Ok(other) => return Err(AnalysisError::UnsupportedFormat(format!("{:?}", other))),
            Err(e) => return Err(AnalysisError::ImageDecode(e)),
        };

        return Ok(Upload { bytes, mime });
    }

    Err(AnalysisError::invalid_upload(format!(
        "missing '{}' file field",
        UPLOAD_FIELD
    )))
}

/// Body-limit rejections keep their own variant; anything else is a malformed upload
fn multipart_error(error: MultipartError, limit: usize) -> AnalysisError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AnalysisError::UploadTooLarge { limit }
    } else {
        AnalysisError::invalid_upload(error.body_text())
    }
}

fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        AnalysisError::EngineUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Ocr { .. } | AnalysisError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_page(error: &AnalysisError, upload: Option<&Upload>) -> Response {
    let status = status_for(error);
    if status.is_server_error() {
        warn!(error = %error, "Analysis failed");
    } else {
        info!(error = %error, "Rejected upload");
    }

    let message = error.to_string();
    let page = render_page(&PageContext {
        report: None,
        image: upload.map(|u| UploadedImage {
            bytes: &u.bytes,
            mime: u.mime,
        }),
        error: Some(&message),
    });
    (status, Html(page)).into_response()
}
