use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture_url: String,
    pub domain: Option<String>,
    pub year_of_study: Option<i32>,
    pub resume_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member row plus the names of its linked skills.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberWithSkills {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub member: MemberRow,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AchievementRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub company: String,
    pub role: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LinkRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub name: String,
    pub url: String,
}

/// Everything the profile page and the exporters show for one member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    #[serde(flatten)]
    pub member: MemberRow,
    pub skills: Vec<String>,
    pub achievements: Vec<AchievementRow>,
    pub experiences: Vec<ExperienceRow>,
    pub links: Vec<LinkRow>,
}
