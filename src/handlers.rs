use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::extraction::{ResumeData, ResumeExtractor};
use crate::gemini::GeminiClient;
use crate::matching::{MatchAnalysis, MatchAnalyzer};
use crate::pdf;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Maximum length of the raw-text preview returned by `/extract-resume`.
const RAW_TEXT_PREVIEW_CHARS: usize = 500;

/// Minimum length of a job description after trimming.
const MIN_JD_CHARS: usize = 10;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the Gemini generateContent API.
    pub gemini: GeminiClient,
}

/// Response body for `POST /screen-resume`.
#[derive(Debug, Serialize)]
pub struct ScreenResumeResponse {
    pub match_score: i64,
    pub match_summary: String,
    /// Full analysis, included for debugging.
    pub detailed_analysis: MatchAnalysis,
}

/// Response body for `POST /extract-resume`.
#[derive(Debug, Serialize)]
pub struct ExtractResumeResponse {
    pub extracted_data: ResumeData,
    pub raw_text_preview: String,
}

/// An uploaded résumé file pulled out of a multipart request.
#[derive(Debug)]
struct ResumeUpload {
    filename: String,
    bytes: Bytes,
}

/// Builds a plain router with all routes wired to `state`.
///
/// The binary assembles its own route tree so it can put rate limiting and
/// body-size caps on the upload routes only; this flat variant backs the
/// HTTP-level tests.
pub fn router(state: Arc<AppState>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/screen-resume", post(screen_resume))
        .route("/extract-resume", post(extract_resume))
        .with_state(state)
}

/// Health check endpoint.
///
/// Probes the Gemini API and reports connectivity alongside the service
/// status.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let connected = state.gemini.check_connection().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "gemini_ai": if connected { "connected" } else { "disconnected" },
        })),
    )
}

/// GET /
///
/// Service banner.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Intelligent Resume Screener API",
        "status": "running",
    }))
}

/// POST /screen-resume
///
/// Screens a résumé against a job description: validates the upload,
/// extracts PDF text, extracts structured data via the model, then scores
/// the candidate via a second model call. Each stage aborts the request on
/// failure; no stage ever continues with partial data.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `multipart` - Multipart body with `resume_file` (PDF) and `jd_text` fields.
///
/// # Returns
///
/// * `Result<Json<ScreenResumeResponse>, AppError>` - The match score, summary,
///   and full analysis, or an error.
pub async fn screen_resume(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ScreenResumeResponse>, AppError> {
    let (upload, jd_text) = read_multipart(multipart).await?;

    let upload = validate_upload(upload)?;

    let jd_text = jd_text
        .ok_or_else(|| AppError::BadRequest("Missing 'jd_text' field".to_string()))?;
    if jd_text.trim().chars().count() < MIN_JD_CHARS {
        return Err(AppError::BadRequest(format!(
            "Job description must be at least {} characters long",
            MIN_JD_CHARS
        )));
    }

    tracing::info!("Processing resume: {}", upload.filename);

    let resume_text =
        pdf::extract_text(&upload.bytes).context("text extraction stage")?;
    tracing::info!("Successfully extracted text from PDF");

    let extractor = ResumeExtractor::new(state.gemini.clone());
    let resume_data = extractor
        .extract(&resume_text)
        .await
        .context("data extraction stage")?;
    tracing::info!("Successfully extracted resume data using AI");

    let analyzer = MatchAnalyzer::new(state.gemini.clone());
    let analysis = analyzer
        .analyze(&resume_data, &jd_text)
        .await
        .context("match analysis stage")?;

    Ok(Json(ScreenResumeResponse {
        match_score: analysis.match_score,
        match_summary: analysis.match_summary.clone(),
        detailed_analysis: analysis,
    }))
}

/// POST /extract-resume
///
/// Extracts structured data from a résumé without scoring it.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `multipart` - Multipart body with a `resume_file` (PDF) field.
///
/// # Returns
///
/// * `Result<Json<ExtractResumeResponse>, AppError>` - The extracted data and
///   a truncated preview of the raw PDF text, or an error.
pub async fn extract_resume(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ExtractResumeResponse>, AppError> {
    let (upload, _jd_text) = read_multipart(multipart).await?;

    let upload = validate_upload(upload)?;

    tracing::info!("Extracting resume data: {}", upload.filename);

    let resume_text =
        pdf::extract_text(&upload.bytes).context("text extraction stage")?;

    let extractor = ResumeExtractor::new(state.gemini.clone());
    let resume_data = extractor
        .extract(&resume_text)
        .await
        .context("data extraction stage")?;

    Ok(Json(ExtractResumeResponse {
        extracted_data: resume_data,
        raw_text_preview: preview(&resume_text, RAW_TEXT_PREVIEW_CHARS),
    }))
}

/// Pulls the résumé upload and job-description text out of a multipart body.
/// Unknown fields are ignored.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Option<ResumeUpload>, Option<String>), AppError> {
    let mut upload = None;
    let mut jd_text = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Invalid multipart request: {}", e))
    })? {
        match field.name() {
            Some("resume_file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read uploaded file: {}", e))
                })?;
                upload = Some(ResumeUpload { filename, bytes });
            }
            Some("jd_text") => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read job description: {}", e))
                })?;
                jd_text = Some(text);
            }
            _ => continue,
        }
    }

    Ok((upload, jd_text))
}

/// Validates the uploaded file: present, named `*.pdf`, and parseable as a PDF.
fn validate_upload(upload: Option<ResumeUpload>) -> Result<ResumeUpload, AppError> {
    let upload = upload
        .ok_or_else(|| AppError::BadRequest("Missing 'resume_file' field".to_string()))?;

    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::BadRequest(
            "Only PDF files are supported".to_string(),
        ));
    }

    if !pdf::is_valid_pdf(&upload.bytes) {
        return Err(AppError::BadRequest(
            "Invalid PDF file or file is corrupted".to_string(),
        ));
    }

    Ok(upload)
}

/// Truncates text to `max_chars` characters, appending an ellipsis when
/// anything was cut. Operates on char boundaries.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
