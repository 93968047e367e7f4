//! Axum route handlers for profile exports.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::directory::members::find_member;
use crate::directory::profile::get_profiles;
use crate::errors::AppError;
use crate::export::email::{build_messages, enqueue};
use crate::export::pdf::render_profiles_pdf;
use crate::extract::AppJson;
use crate::models::member::MemberProfile;
use crate::state::AppState;

pub const PDF_FILE_NAME: &str = "profiles.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(rename = "memberIds", alias = "member_ids")]
    pub member_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct EmailExportRequest {
    #[serde(rename = "memberIds", alias = "member_ids")]
    pub member_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct JsonExportResponse {
    pub members: Vec<MemberProfile>,
}

#[derive(Debug, Serialize)]
pub struct EmailExportResponse {
    pub success: bool,
    pub queued: usize,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/export/json
pub async fn handle_export_json(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExportRequest>,
) -> Result<Json<JsonExportResponse>, AppError> {
    let ids = require_member_ids(req.member_ids)?;
    let members = get_profiles(&state.db, &ids).await?;

    info!(requested = ids.len(), exported = members.len(), "JSON export");
    Ok(Json(JsonExportResponse { members }))
}

/// POST /api/export/pdf
///
/// Responds with the PDF as an attachment.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExportRequest>,
) -> Result<Response, AppError> {
    let ids = require_member_ids(req.member_ids)?;
    let profiles = get_profiles(&state.db, &ids).await?;
    let exported = profiles.len();

    let bytes = tokio::task::spawn_blocking(move || render_profiles_pdf(&profiles))
        .await
        .map_err(|e| AppError::Pdf(format!("PDF task failed: {e}")))??;

    info!(exported, bytes = bytes.len(), "PDF export");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// POST /api/export/email
///
/// Queues one message per selected member on the outbox.
pub async fn handle_export_email(
    State(state): State<AppState>,
    AppJson(req): AppJson<EmailExportRequest>,
) -> Result<Json<EmailExportResponse>, AppError> {
    let ids = require_member_ids(req.member_ids)?;
    let subject = req.subject.trim();
    let body = req.body.trim();
    if subject.is_empty() || body.is_empty() {
        return Err(AppError::Validation(
            "Subject and body are required".to_string(),
        ));
    }

    let mut members = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(member) = find_member(&state.db, *id).await? {
            members.push(member);
        }
    }

    let messages = build_messages(&members, &state.config.email_from, subject, body);
    let queued = enqueue(&state.redis, &messages).await?;

    info!(requested = ids.len(), queued, "Email export queued");
    Ok(Json(EmailExportResponse {
        success: true,
        queued,
        message: format!("Email sent to {queued} member(s)"),
    }))
}

fn require_member_ids(ids: Option<Vec<Uuid>>) -> Result<Vec<Uuid>, AppError> {
    match ids {
        Some(ids) if !ids.is_empty() => Ok(dedup_preserving_order(ids)),
        _ => Err(AppError::Validation("No member IDs provided".to_string())),
    }
}

fn dedup_preserving_order(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
