//! Per-member child records: achievements, experiences and links.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::member::{AchievementRow, ExperienceRow, LinkRow};

// ────────────────────────────────────────────────────────────────────────────
// Achievements
// ────────────────────────────────────────────────────────────────────────────

pub async fn member_achievements(
    conn: &mut PgConnection,
    member_id: Uuid,
) -> Result<Vec<AchievementRow>> {
    Ok(sqlx::query_as::<_, AchievementRow>(
        r#"
        SELECT * FROM achievements
        WHERE member_id = $1
        ORDER BY date DESC NULLS LAST, created_at DESC
        "#,
    )
    .bind(member_id)
    .fetch_all(&mut *conn)
    .await?)
}

/// Appends one achievement per non-blank title. Returns how many were stored.
pub async fn add_achievements(
    conn: &mut PgConnection,
    member_id: Uuid,
    titles: &[String],
) -> Result<usize> {
    let mut inserted = 0;
    for title in titles.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        sqlx::query("INSERT INTO achievements (id, member_id, title) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(member_id)
            .bind(title)
            .execute(&mut *conn)
            .await?;
        inserted += 1;
    }
    Ok(inserted)
}

pub async fn replace_achievements(
    conn: &mut PgConnection,
    member_id: Uuid,
    titles: &[String],
) -> Result<usize> {
    sqlx::query("DELETE FROM achievements WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut *conn)
        .await?;
    add_achievements(conn, member_id, titles).await
}

// ────────────────────────────────────────────────────────────────────────────
// Experiences
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceInput {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

impl ExperienceInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.company.trim().is_empty() || self.role.trim().is_empty() {
            return Err("Each experience needs a company and a role".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(format!(
                    "Experience at {} ends before it starts",
                    self.company.trim()
                ));
            }
        }
        Ok(())
    }
}

/// Current roles first, then most recent start date.
pub async fn member_experiences(
    conn: &mut PgConnection,
    member_id: Uuid,
) -> Result<Vec<ExperienceRow>> {
    Ok(sqlx::query_as::<_, ExperienceRow>(
        r#"
        SELECT * FROM experiences
        WHERE member_id = $1
        ORDER BY is_current DESC, start_date DESC NULLS LAST
        "#,
    )
    .bind(member_id)
    .fetch_all(&mut *conn)
    .await?)
}

/// Deletes the member's experiences and inserts `experiences` in their place.
/// Callers run this inside a transaction.
pub async fn replace_experiences(
    conn: &mut PgConnection,
    member_id: Uuid,
    experiences: &[ExperienceInput],
) -> Result<usize> {
    sqlx::query("DELETE FROM experiences WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut *conn)
        .await?;

    for exp in experiences {
        // A current role has no end date.
        let end_date = if exp.is_current { None } else { exp.end_date };
        sqlx::query(
            r#"
            INSERT INTO experiences
                (id, member_id, company, role, description, start_date, end_date, is_current)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(exp.company.trim())
        .bind(exp.role.trim())
        .bind(&exp.description)
        .bind(exp.start_date)
        .bind(end_date)
        .bind(exp.is_current)
        .execute(&mut *conn)
        .await?;
    }

    Ok(experiences.len())
}

// ────────────────────────────────────────────────────────────────────────────
// Links
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LinkInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

pub async fn member_links(conn: &mut PgConnection, member_id: Uuid) -> Result<Vec<LinkRow>> {
    Ok(
        sqlx::query_as::<_, LinkRow>("SELECT * FROM links WHERE member_id = $1 ORDER BY name")
            .bind(member_id)
            .fetch_all(&mut *conn)
            .await?,
    )
}

/// Upserts links by `(member_id, name)`. Entries missing a name or url are skipped.
pub async fn upsert_links(
    conn: &mut PgConnection,
    member_id: Uuid,
    links: &[LinkInput],
) -> Result<usize> {
    let mut saved = 0;
    for link in links {
        let (name, url) = (link.name.trim(), link.url.trim());
        if name.is_empty() || url.is_empty() {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO links (id, member_id, name, url) VALUES ($1, $2, $3, $4)
            ON CONFLICT (member_id, name) DO UPDATE SET url = EXCLUDED.url
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(name)
        .bind(url)
        .execute(&mut *conn)
        .await?;
        saved += 1;
    }
    Ok(saved)
}
