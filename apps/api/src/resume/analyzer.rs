//! Résumé analysis: turns extracted PDF text into a `ParsedResume`.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`, chosen at startup via
//! `ENABLE_LLM_PARSING`. The LLM analyzer falls back to keyword matching
//! whenever the model call fails or its reply cannot be read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::year::{year_from_json, MAX_PARSED_YEAR, MIN_PARSED_YEAR};
use crate::resume::keywords;
use crate::resume::prompts::{build_parse_prompt, RESUME_PARSE_SYSTEM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    Llm,
    Keyword,
}

/// Structured profile data pulled from a résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub skills: Vec<String>,
    pub domain: Option<String>,
    pub year: Option<i32>,
    pub achievements: Vec<String>,
    pub parsed_by: ParseSource,
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<ParsedResume, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordResumeAnalyzer
// ────────────────────────────────────────────────────────────────────────────

/// Static-list lookup. Deterministic, no network.
pub struct KeywordResumeAnalyzer;

impl KeywordResumeAnalyzer {
    pub fn parse(text: &str) -> ParsedResume {
        ParsedResume {
            skills: keywords::extract_skills(text),
            domain: keywords::extract_domain(text),
            year: keywords::extract_year_of_study(text),
            achievements: keywords::extract_achievements(text),
            parsed_by: ParseSource::Keyword,
        }
    }
}

#[async_trait]
impl ResumeAnalyzer for KeywordResumeAnalyzer {
    async fn analyze(&self, text: &str) -> Result<ParsedResume, AppError> {
        Ok(Self::parse(text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResumeAnalyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeAnalyzer {
    llm: LlmClient,
}

impl LlmResumeAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, text: &str) -> Result<ParsedResume, AppError> {
        let prompt = build_parse_prompt(text);
        let reply = self
            .llm
            .call_json::<Value>(&prompt, RESUME_PARSE_SYSTEM)
            .await;
        Ok(resolve_reply(reply, text))
    }
}

/// Uses the model reply when it is a JSON object, otherwise the keyword result.
fn resolve_reply(reply: Result<Value, LlmError>, text: &str) -> ParsedResume {
    match reply {
        Ok(value @ Value::Object(_)) => {
            let parsed = coerce_reply(&value);
            debug!(
                skills = parsed.skills.len(),
                achievements = parsed.achievements.len(),
                "Parsed resume with LLM"
            );
            parsed
        }
        Ok(other) => {
            warn!("LLM returned non-object JSON ({other}), falling back to keyword parsing");
            KeywordResumeAnalyzer::parse(text)
        }
        Err(e) => {
            warn!("LLM resume parsing failed, falling back to keyword parsing: {e}");
            KeywordResumeAnalyzer::parse(text)
        }
    }
}

/// Coerces a model reply into the fixed schema. Missing or ill-typed keys
/// become empty, strings are trimmed and de-duplicated, and years outside
/// 1..=5 are dropped.
pub fn coerce_reply(value: &Value) -> ParsedResume {
    let domain = value
        .get("domain")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    let year = value
        .get("year")
        .and_then(year_from_json)
        .filter(|y| (MIN_PARSED_YEAR..=MAX_PARSED_YEAR).contains(y));

    ParsedResume {
        skills: string_list(value.get("skills")),
        domain,
        year,
        achievements: string_list(value.get("achievements")),
        parsed_by: ParseSource::Llm,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::new();
    for item in items.iter().filter_map(Value::as_str) {
        let item = item.trim();
        if item.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(item)) {
            continue;
        }
        out.push(item.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_full_reply() {
        let parsed = coerce_reply(&json!({
            "skills": ["Rust", "Python"],
            "domain": "Backend Development",
            "year": 3,
            "achievements": ["Won HackMIT"]
        }));
        assert_eq!(parsed.skills, vec!["Rust", "Python"]);
        assert_eq!(parsed.domain.as_deref(), Some("Backend Development"));
        assert_eq!(parsed.year, Some(3));
        assert_eq!(parsed.achievements, vec!["Won HackMIT"]);
        assert_eq!(parsed.parsed_by, ParseSource::Llm);
    }

    #[test]
    fn test_coerce_missing_keys_become_empty() {
        let parsed = coerce_reply(&json!({}));
        assert!(parsed.skills.is_empty());
        assert!(parsed.achievements.is_empty());
        assert_eq!(parsed.domain, None);
        assert_eq!(parsed.year, None);
    }

    #[test]
    fn test_coerce_cleans_skill_list() {
        let parsed = coerce_reply(&json!({
            "skills": [" Rust ", "rust", 42, "", null, "Go"],
            "achievements": "not a list"
        }));
        assert_eq!(parsed.skills, vec!["Rust", "Go"]);
        assert!(parsed.achievements.is_empty());
    }

    #[test]
    fn test_coerce_year_variants() {
        assert_eq!(coerce_reply(&json!({ "year": "2" })).year, Some(2));
        assert_eq!(coerce_reply(&json!({ "year": 9 })).year, None);
        assert_eq!(coerce_reply(&json!({ "year": 0 })).year, None);
        assert_eq!(coerce_reply(&json!({ "year": null })).year, None);
    }

    #[test]
    fn test_coerce_blank_domain_is_none() {
        assert_eq!(coerce_reply(&json!({ "domain": "   " })).domain, None);
    }

    #[test]
    fn test_failed_reply_falls_back_to_keywords() {
        let reply = Err(LlmError::EmptyContent);
        let parsed = resolve_reply(reply, "2nd year student skilled in Docker and Kubernetes");
        assert_eq!(parsed.parsed_by, ParseSource::Keyword);
        assert_eq!(parsed.year, Some(2));
        assert_eq!(parsed.domain.as_deref(), Some("DevOps"));
    }

    #[test]
    fn test_non_object_reply_falls_back_to_keywords() {
        let parsed = resolve_reply(Ok(json!(["Rust"])), "Rust");
        assert_eq!(parsed.parsed_by, ParseSource::Keyword);
        assert_eq!(parsed.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_keyword_analyzer_via_trait() {
        let analyzer: Box<dyn ResumeAnalyzer> = Box::new(KeywordResumeAnalyzer);
        let parsed = analyzer.analyze("Figma and Sketch wizard").await.unwrap();
        assert_eq!(parsed.domain.as_deref(), Some("UI/UX Design"));
    }
}
