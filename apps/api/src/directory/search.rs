//! Directory search: free-text terms, domain/year facets and an all-of skill filter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::directory::members::MEMBER_WITH_SKILLS_SELECT;
use crate::models::member::MemberWithSkills;
use crate::models::year::{parse_year_param, year_label};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchFilters {
    /// Lowercased whitespace-separated terms; each must match name, email or domain.
    pub terms: Vec<String>,
    pub domains: Vec<String>,
    pub years: Vec<i32>,
    /// Every listed skill must be present on the member.
    pub skills: Vec<String>,
}

impl SearchFilters {
    /// Builds filters from raw query pairs so repeated keys
    /// (`?domain=a&domain=b`) are all kept.
    pub fn from_query_pairs(pairs: &[(String, String)]) -> Self {
        let mut filters = SearchFilters::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "search" => filters
                    .terms
                    .extend(value.split_whitespace().map(str::to_lowercase)),
                "domain" => filters.domains.push(value.to_string()),
                "year" => filters.years.extend(parse_year_param(value)),
                "skills" => filters.skills.push(value.to_string()),
                _ => {}
            }
        }

        filters
    }
}

/// A directory listing row. `year_of_study` is the display label.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture_url: String,
    pub domain: Option<String>,
    pub year_of_study: &'static str,
    pub year: Option<i32>,
    pub resume_url: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberWithSkills> for DirectoryEntry {
    fn from(row: MemberWithSkills) -> Self {
        let m = row.member;
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            picture_url: m.picture_url,
            domain: m.domain,
            year_of_study: year_label(m.year_of_study),
            year: m.year_of_study,
            resume_url: m.resume_url,
            skills: row.skills,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub async fn search_members(pool: &PgPool, filters: &SearchFilters) -> Result<Vec<DirectoryEntry>> {
    let mut qb = build_search_query(filters);
    let rows = qb
        .build_query_as::<MemberWithSkills>()
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .filter(|row| has_all_skills(&row.skills, &filters.skills))
        .map(DirectoryEntry::from)
        .collect())
}

fn build_search_query(filters: &SearchFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(MEMBER_WITH_SKILLS_SELECT);
    qb.push(" WHERE TRUE");

    for term in &filters.terms {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (m.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.domain ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if !filters.domains.is_empty() {
        qb.push(" AND m.domain = ANY(")
            .push_bind(filters.domains.clone())
            .push(")");
    }

    if !filters.years.is_empty() {
        qb.push(" AND m.year_of_study = ANY(")
            .push_bind(filters.years.clone())
            .push(")");
    }

    qb.push(" GROUP BY m.id ORDER BY m.name");
    qb
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn has_all_skills(member_skills: &[String], required: &[String]) -> bool {
    required.iter().all(|skill| member_skills.contains(skill))
}
