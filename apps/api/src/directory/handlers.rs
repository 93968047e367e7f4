//! Axum route handlers for members, profile records and directory search.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::directory::members::{list_members, member_exists, upsert_member, MemberDraft};
use crate::directory::profile::{apply_profile_update, get_profile, ProfileUpdate};
use crate::directory::records::{
    add_achievements, replace_experiences, upsert_links, ExperienceInput, LinkInput,
};
use crate::directory::search::{search_members, DirectoryEntry, SearchFilters};
use crate::directory::skills::{add_member_skills, list_skills};
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::member::{MemberProfile, MemberRow, MemberWithSkills, SkillRow};
use crate::models::year::year_from_json;
use crate::resume::session::load_session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MemberUpsertRequest {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub domain: Option<String>,
    pub year_of_study: Option<Value>,
    pub picture_url: Option<String>,
    /// Links the résumé stored by an earlier upload to this member.
    pub upload_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct MemberSkillsRequest {
    pub member_id: Option<Uuid>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AchievementsRequest {
    pub member_id: Option<Uuid>,
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ExperiencesRequest {
    pub member_id: Option<Uuid>,
    pub experiences: Option<Vec<ExperienceInput>>,
}

#[derive(Debug, Deserialize)]
pub struct LinksRequest {
    pub member_id: Option<Uuid>,
    pub links: Option<Vec<LinkInput>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub domain: Option<String>,
    pub year: Option<Value>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    pub upload_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub success: bool,
    pub saved: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub success: bool,
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<DirectoryEntry>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/members
///
/// Upserts a member by id and returns the stored row.
pub async fn handle_upsert_member(
    State(state): State<AppState>,
    AppJson(req): AppJson<MemberUpsertRequest>,
) -> Result<Json<MemberRow>, AppError> {
    let name = require_text(&req.name, "name")?;
    let email = require_email(&req.email)?;

    let resume_url = match req.upload_id {
        Some(upload_id) => resume_url_for_upload(&state, upload_id).await?,
        None => None,
    };

    let draft = MemberDraft {
        id: req.id.unwrap_or_else(Uuid::new_v4),
        name,
        email,
        picture_url: req.picture_url.unwrap_or_default(),
        domain: clean_optional(req.domain),
        year_of_study: req.year_of_study.as_ref().and_then(year_from_json),
        resume_url: resume_url.unwrap_or_default(),
    };

    let mut conn = state.db.acquire().await?;
    let member = upsert_member(&mut conn, &draft).await?;

    info!(member_id = %member.id, "Upserted member");
    Ok(Json(member))
}

/// GET /api/members
pub async fn handle_list_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberWithSkills>>, AppError> {
    Ok(Json(list_members(&state.db).await?))
}

/// GET /api/members/:id
pub async fn handle_get_member(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MemberProfile>, AppError> {
    get_profile(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Member {id} not found")))
}

/// GET /api/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    Ok(Json(list_skills(&state.db).await?))
}

/// POST /api/member-skills
///
/// Adds skills to a member, creating unknown skills by name.
pub async fn handle_member_skills(
    State(state): State<AppState>,
    AppJson(req): AppJson<MemberSkillsRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    let (member_id, skills) = require_payload(req.member_id, req.skills, "Invalid payload")?;

    let mut tx = state.db.begin().await?;
    ensure_member(&mut tx, member_id).await?;
    let saved = add_member_skills(&mut tx, member_id, &skills).await?;
    tx.commit().await?;

    Ok(Json(SavedResponse {
        success: true,
        saved,
    }))
}

/// POST /api/achievements
pub async fn handle_achievements(
    State(state): State<AppState>,
    AppJson(req): AppJson<AchievementsRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    let (member_id, achievements) =
        require_payload(req.member_id, req.achievements, "Invalid payload")?;

    let mut tx = state.db.begin().await?;
    ensure_member(&mut tx, member_id).await?;
    let saved = add_achievements(&mut tx, member_id, &achievements).await?;
    tx.commit().await?;

    Ok(Json(SavedResponse {
        success: true,
        saved,
    }))
}

/// POST /api/experiences
///
/// Replaces every experience of the member with the submitted list.
pub async fn handle_experiences(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExperiencesRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    let (member_id, experiences) =
        require_payload(req.member_id, req.experiences, "Invalid payload")?;

    for exp in &experiences {
        exp.validate().map_err(AppError::Validation)?;
    }

    let mut tx = state.db.begin().await?;
    ensure_member(&mut tx, member_id).await?;
    let saved = replace_experiences(&mut tx, member_id, &experiences).await?;
    tx.commit().await?;

    Ok(Json(SavedResponse {
        success: true,
        saved,
    }))
}

/// POST /api/links
///
/// Upserts links by name (GitHub, LinkedIn, ...). Incomplete entries are skipped.
pub async fn handle_links(
    State(state): State<AppState>,
    AppJson(req): AppJson<LinksRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    let (member_id, links) =
        require_payload(req.member_id, req.links, "member_id and links are required")?;

    let mut tx = state.db.begin().await?;
    ensure_member(&mut tx, member_id).await?;
    let saved = upsert_links(&mut tx, member_id, &links).await?;
    tx.commit().await?;

    Ok(Json(SavedResponse {
        success: true,
        saved,
    }))
}

/// POST /api/profile/update
///
/// Saves the confirm/edit form: member details, the full skill set and achievements.
pub async fn handle_profile_update(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProfileUpdateRequest>,
) -> Result<Json<ProfileUpdateResponse>, AppError> {
    let resume_url = match req.upload_id {
        Some(upload_id) => resume_url_for_upload(&state, upload_id).await?,
        None => None,
    };

    let update = ProfileUpdate {
        id: req.id,
        name: require_text(&req.name, "name")?,
        email: require_email(&req.email)?,
        domain: clean_optional(req.domain),
        year_of_study: req.year.as_ref().and_then(year_from_json),
        skills: req.skills,
        achievements: req.achievements,
        resume_url,
    };

    let member = apply_profile_update(&state.db, &update).await?;

    Ok(Json(ProfileUpdateResponse {
        success: true,
        id: member.id,
        message: "Profile updated successfully".to_string(),
    }))
}

/// GET /api/directory/search?search=&domain=&year=&skills=
///
/// Query keys may repeat; see `SearchFilters::from_query_pairs`.
pub async fn handle_search(
    State(state): State<AppState>,
    AppQuery(pairs): AppQuery<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, AppError> {
    let filters = SearchFilters::from_query_pairs(&pairs);
    let results = search_members(&state.db, &filters).await?;

    Ok(Json(SearchResponse {
        success: true,
        count: results.len(),
        results,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_payload<T>(
    member_id: Option<Uuid>,
    items: Option<Vec<T>>,
    message: &str,
) -> Result<(Uuid, Vec<T>), AppError> {
    match (member_id, items) {
        (Some(member_id), Some(items)) => Ok((member_id, items)),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn require_email(value: &str) -> Result<String, AppError> {
    let email = require_text(value, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation(format!("'{email}' is not a valid email"))),
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn ensure_member(conn: &mut sqlx::PgConnection, member_id: Uuid) -> Result<(), AppError> {
    if member_exists(conn, member_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Member {member_id} not found")))
    }
}

/// An expired upload does not block saving the profile; the résumé link is just dropped.
async fn resume_url_for_upload(state: &AppState, upload_id: Uuid) -> Result<Option<String>, AppError> {
    let session = load_session(&state.redis, upload_id).await?;
    if session.is_none() {
        warn!(upload_id = %upload_id, "Upload session expired before profile was saved");
    }
    Ok(session.map(|s| s.resume_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_payload() {
        let id = Uuid::new_v4();
        assert!(require_payload(Some(id), Some(vec!["Rust"]), "x").is_ok());
        assert!(require_payload::<String>(None, Some(vec![]), "x").is_err());
        assert!(require_payload::<String>(Some(id), None, "x").is_err());
    }

    #[test]
    fn test_require_email() {
        assert_eq!(require_email(" jane@uni.edu ").unwrap(), "jane@uni.edu");
        assert!(require_email("jane").is_err());
        assert!(require_email("@uni.edu").is_err());
        assert!(require_email("").is_err());
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" ML ".into())).as_deref(), Some("ML"));
    }

    #[test]
    fn test_profile_update_request_defaults() {
        let req: ProfileUpdateRequest =
            serde_json::from_str(r#"{"name":"Jane","email":"jane@uni.edu","year":"2"}"#).unwrap();
        assert!(req.skills.is_empty());
        assert_eq!(req.year.as_ref().and_then(year_from_json), Some(2));
    }
}
