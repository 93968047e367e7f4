//! Axum route handlers for résumé upload.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::resume::analyzer::ParseSource;
use crate::resume::extract::{extract_text, looks_like_pdf};
use crate::resume::session::{load_session, save_session, UploadSession};
use crate::resume::storage::{object_url, store_resume};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub id: Uuid,
    pub resume_url: String,
    pub skills: Vec<String>,
    pub domain: Option<String>,
    pub year: Option<i32>,
    pub achievements: Vec<String>,
    pub parsed_by: ParseSource,
}

impl From<&UploadSession> for UploadResponse {
    fn from(session: &UploadSession) -> Self {
        Self {
            success: true,
            id: session.id,
            resume_url: session.resume_url.clone(),
            skills: session.parsed.skills.clone(),
            domain: session.parsed.domain.clone(),
            year: session.parsed.year,
            achievements: session.parsed.achievements.clone(),
            parsed_by: session.parsed.parsed_by,
        }
    }
}

struct ResumeFile {
    file_name: String,
    data: Bytes,
}

/// POST /api/resume/upload
///
/// Multipart form with a single `resume` PDF. Extracts text, analyzes it,
/// stores the original and parks the result for the confirm step.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let file = read_resume_field(multipart, state.config.max_upload_bytes).await?;

    info!(file_name = %file.file_name, bytes = file.data.len(), "Processing resume upload");

    let text = extract_text(file.data.clone()).await?;
    let parsed = state.analyzer.analyze(&text).await?;

    let upload_id = Uuid::new_v4();
    let resume_key = store_resume(&state.s3, &state.config.s3_bucket, upload_id, file.data).await?;

    let session = UploadSession {
        id: upload_id,
        file_name: file.file_name,
        resume_url: object_url(&state.config.s3_endpoint, &state.config.s3_bucket, &resume_key),
        resume_key,
        parsed,
        uploaded_at: Utc::now(),
    };
    save_session(&state.redis, &session, state.config.upload_session_ttl_secs).await?;

    info!(
        upload_id = %upload_id,
        skills = session.parsed.skills.len(),
        parsed_by = ?session.parsed.parsed_by,
        "Resume parsed"
    );

    Ok(Json(UploadResponse::from(&session)))
}

/// GET /api/resume/upload/:id
///
/// Returns a parsed upload that has not expired yet.
pub async fn handle_get_upload(
    State(state): State<AppState>,
    AppPath(upload_id): AppPath<Uuid>,
) -> Result<Json<UploadResponse>, AppError> {
    let session = load_session(&state.redis, upload_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload {upload_id} not found or expired")))?;

    Ok(Json(UploadResponse::from(&session)))
}

async fn read_resume_field(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<ResumeFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(AppError::Validation(
                "Only PDF files are supported".to_string(),
            ));
        }

        let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;

        validate_resume_bytes(&data, max_bytes)?;
        return Ok(ResumeFile { file_name, data });
    }

    Err(AppError::Validation("No resume file provided".to_string()))
}

fn validate_resume_bytes(data: &[u8], max_bytes: usize) -> Result<(), AppError> {
    if data.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "File size exceeds {}MB limit",
            max_bytes / (1024 * 1024)
        )));
    }
    if !looks_like_pdf(data) {
        return Err(AppError::Validation(
            "Only PDF files are supported".to_string(),
        ));
    }
    Ok(())
}
