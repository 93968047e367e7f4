use anyhow::Result;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::member::{MemberRow, MemberWithSkills};

/// Fields a caller may set on a member. Timestamps and `resume_url`
/// bookkeeping are handled by the queries below.
#[derive(Debug, Clone)]
pub struct MemberDraft {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture_url: String,
    pub domain: Option<String>,
    pub year_of_study: Option<i32>,
    /// Empty string leaves an existing résumé URL untouched.
    pub resume_url: String,
}

/// Member columns plus aggregated skill names, grouped per member.
pub(crate) const MEMBER_WITH_SKILLS_SELECT: &str = r#"
    SELECT m.*,
           COALESCE(
               array_agg(s.name ORDER BY s.name) FILTER (WHERE s.name IS NOT NULL),
               '{}'
           ) AS skills
    FROM members m
    LEFT JOIN member_skills ms ON ms.member_id = m.id
    LEFT JOIN skills s ON s.id = ms.skill_id
"#;

pub async fn list_members(pool: &PgPool) -> Result<Vec<MemberWithSkills>> {
    let sql = format!("{MEMBER_WITH_SKILLS_SELECT} GROUP BY m.id ORDER BY m.name");
    Ok(sqlx::query_as::<_, MemberWithSkills>(&sql)
        .fetch_all(pool)
        .await?)
}

pub async fn find_member(pool: &PgPool, id: Uuid) -> Result<Option<MemberRow>> {
    Ok(
        sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn member_exists(conn: &mut PgConnection, id: Uuid) -> Result<bool> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?,
    )
}

/// Inserts or updates by id and returns the stored row.
/// An empty `resume_url` never overwrites one already on file.
pub async fn upsert_member(conn: &mut PgConnection, draft: &MemberDraft) -> Result<MemberRow> {
    Ok(sqlx::query_as::<_, MemberRow>(
        r#"
        INSERT INTO members
            (id, name, email, picture_url, domain, year_of_study, resume_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            name          = EXCLUDED.name,
            email         = EXCLUDED.email,
            picture_url   = EXCLUDED.picture_url,
            domain        = EXCLUDED.domain,
            year_of_study = EXCLUDED.year_of_study,
            resume_url    = CASE
                                WHEN EXCLUDED.resume_url = '' THEN members.resume_url
                                ELSE EXCLUDED.resume_url
                            END,
            updated_at    = NOW()
        RETURNING *
        "#,
    )
    .bind(draft.id)
    .bind(&draft.name)
    .bind(&draft.email)
    .bind(&draft.picture_url)
    .bind(&draft.domain)
    .bind(draft.year_of_study)
    .bind(&draft.resume_url)
    .fetch_one(&mut *conn)
    .await?)
}

/// Updates the editable profile fields of an existing member.
/// Returns `None` if no member has this id.
pub async fn update_member_details(
    conn: &mut PgConnection,
    id: Uuid,
    name: &str,
    email: &str,
    domain: Option<&str>,
    year_of_study: Option<i32>,
) -> Result<Option<MemberRow>> {
    Ok(sqlx::query_as::<_, MemberRow>(
        r#"
        UPDATE members
        SET name = $2, email = $3, domain = $4, year_of_study = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(domain)
    .bind(year_of_study)
    .fetch_optional(&mut *conn)
    .await?)
}

pub async fn set_resume_url(conn: &mut PgConnection, id: Uuid, resume_url: &str) -> Result<MemberRow> {
    Ok(sqlx::query_as::<_, MemberRow>(
        "UPDATE members SET resume_url = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(resume_url)
    .fetch_one(&mut *conn)
    .await?)
}
