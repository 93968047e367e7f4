use anyhow::Result;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::models::member::SkillRow;

pub async fn list_skills(pool: &PgPool) -> Result<Vec<SkillRow>> {
    Ok(
        sqlx::query_as::<_, SkillRow>("SELECT * FROM skills ORDER BY name")
            .fetch_all(pool)
            .await?,
    )
}

/// Returns the skill with this exact name, creating it if needed.
pub async fn get_or_create_skill(conn: &mut PgConnection, name: &str) -> Result<SkillRow> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    Ok(sqlx::query_as::<_, SkillRow>(
        r#"
        INSERT INTO skills (id, name) VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(&mut *conn)
    .await?)
}

pub async fn link_skill(conn: &mut PgConnection, member_id: Uuid, skill_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT INTO member_skills (member_id, skill_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(member_id)
    .bind(skill_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn unlink_skill(conn: &mut PgConnection, member_id: Uuid, skill_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM member_skills WHERE member_id = $1 AND skill_id = $2")
        .bind(member_id)
        .bind(skill_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn member_skills(conn: &mut PgConnection, member_id: Uuid) -> Result<Vec<SkillRow>> {
    Ok(sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT s.id, s.name
        FROM member_skills ms
        JOIN skills s ON s.id = ms.skill_id
        WHERE ms.member_id = $1
        ORDER BY s.name
        "#,
    )
    .bind(member_id)
    .fetch_all(&mut *conn)
    .await?)
}

/// Adds every named skill to the member. Existing links are kept.
pub async fn add_member_skills(
    conn: &mut PgConnection,
    member_id: Uuid,
    names: &[String],
) -> Result<usize> {
    let names = clean_skill_names(names);
    for name in &names {
        let skill = get_or_create_skill(conn, name).await?;
        link_skill(conn, member_id, skill.id).await?;
    }
    Ok(names.len())
}

/// Makes the member's skills exactly `names`: links new ones, unlinks the rest.
pub async fn sync_member_skills(
    conn: &mut PgConnection,
    member_id: Uuid,
    names: &[String],
) -> Result<()> {
    let existing = member_skills(conn, member_id).await?;
    let wanted = clean_skill_names(names);
    let plan = plan_skill_sync(&existing, &wanted);

    for name in &plan.to_add {
        let skill = get_or_create_skill(conn, name).await?;
        link_skill(conn, member_id, skill.id).await?;
    }
    for skill_id in &plan.to_remove {
        unlink_skill(conn, member_id, *skill_id).await?;
    }

    debug!(
        member_id = %member_id,
        added = plan.to_add.len(),
        removed = plan.to_remove.len(),
        "Synced member skills"
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
pub struct SkillSyncPlan {
    pub to_add: Vec<String>,
    pub to_remove: Vec<Uuid>,
}

pub fn plan_skill_sync(existing: &[SkillRow], wanted: &[String]) -> SkillSyncPlan {
    SkillSyncPlan {
        to_add: wanted
            .iter()
            .filter(|name| !existing.iter().any(|s| &s.name == *name))
            .cloned()
            .collect(),
        to_remove: existing
            .iter()
            .filter(|s| !wanted.contains(&s.name))
            .map(|s| s.id)
            .collect(),
    }
}

/// Trims names and drops blanks and exact duplicates.
pub fn clean_skill_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str) -> SkillRow {
        SkillRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_plan_adds_and_removes() {
        let rust = skill("Rust");
        let java = skill("Java");
        let plan = plan_skill_sync(
            &[rust.clone(), java.clone()],
            &["Rust".to_string(), "Go".to_string()],
        );
        assert_eq!(plan.to_add, vec!["Go".to_string()]);
        assert_eq!(plan.to_remove, vec![java.id]);
    }

    #[test]
    fn test_plan_is_empty_when_unchanged() {
        let plan = plan_skill_sync(&[skill("Rust")], &["Rust".to_string()]);
        assert_eq!(plan, SkillSyncPlan::default());
    }

    #[test]
    fn test_clean_skill_names() {
        let names = vec![
            " Rust ".to_string(),
            "Rust".to_string(),
            "".to_string(),
            "Go".to_string(),
        ];
        assert_eq!(clean_skill_names(&names), vec!["Rust", "Go"]);
    }
}
