//! Whole-profile reads and the confirm/edit write path.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::directory::members::{
    find_member, set_resume_url, update_member_details, upsert_member, MemberDraft,
};
use crate::directory::records::{
    member_achievements, member_experiences, member_links, replace_achievements,
};
use crate::directory::skills::{member_skills, sync_member_skills};
use crate::models::member::{MemberProfile, MemberRow};

/// Loads a member with skills, achievements, experiences and links.
pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<MemberProfile>> {
    let Some(member) = find_member(pool, id).await? else {
        return Ok(None);
    };

    let mut conn = pool.acquire().await?;
    let skills = member_skills(&mut conn, id)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    let achievements = member_achievements(&mut conn, id).await?;
    let experiences = member_experiences(&mut conn, id).await?;
    let links = member_links(&mut conn, id).await?;

    Ok(Some(MemberProfile {
        member,
        skills,
        achievements,
        experiences,
        links,
    }))
}

/// Loads profiles for `ids` in request order, skipping ids with no member.
pub async fn get_profiles(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<MemberProfile>> {
    let mut profiles = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(profile) = get_profile(pool, *id).await? {
            profiles.push(profile);
        }
    }
    Ok(profiles)
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub domain: Option<String>,
    pub year_of_study: Option<i32>,
    pub skills: Vec<String>,
    pub achievements: Vec<String>,
    /// Set when the profile is being confirmed straight from an upload.
    pub resume_url: Option<String>,
}

/// Updates the member if it exists, otherwise creates it; then makes its
/// skills and achievements match the update. Runs in one transaction.
pub async fn apply_profile_update(pool: &PgPool, update: &ProfileUpdate) -> Result<MemberRow> {
    let mut tx = pool.begin().await?;

    let existing = match update.id {
        Some(id) => {
            update_member_details(
                &mut tx,
                id,
                &update.name,
                &update.email,
                update.domain.as_deref(),
                update.year_of_study,
            )
            .await?
        }
        None => None,
    };

    let member = match existing {
        Some(member) => match update.resume_url.as_deref() {
            Some(url) => set_resume_url(&mut tx, member.id, url).await?,
            None => member,
        },
        None => {
            let draft = MemberDraft {
                id: update.id.unwrap_or_else(Uuid::new_v4),
                name: update.name.clone(),
                email: update.email.clone(),
                picture_url: String::new(),
                domain: update.domain.clone(),
                year_of_study: update.year_of_study,
                resume_url: update.resume_url.clone().unwrap_or_default(),
            };
            upsert_member(&mut tx, &draft).await?
        }
    };

    sync_member_skills(&mut tx, member.id, &update.skills).await?;
    replace_achievements(&mut tx, member.id, &update.achievements).await?;

    tx.commit().await?;

    info!(member_id = %member.id, "Profile updated");
    Ok(member)
}
