// Résumé parsing prompt templates.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a precise resume data extractor for a student talent directory. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Only report skills, achievements and details that appear in the resume text.";

pub const RESUME_PARSE_PROMPT: &str = r#"Analyze this resume text and extract the following information:
1. A list of technical skills and technologies
2. The primary domain/field (e.g., Frontend Development, Data Science)
3. Year of study if mentioned (as a number, 1-5)
4. A list of notable achievements

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "skills": ["skill1", "skill2"],
  "domain": "domain name" | null,
  "year": number | null,
  "achievements": ["achievement1", "achievement2"]
}

Return ONLY the raw JSON object — no markdown formatting, no code blocks."#;

/// Upper bound on résumé characters sent to the model.
pub const MAX_PROMPT_CHARS: usize = 24_000;

pub fn build_parse_prompt(resume_text: &str) -> String {
    let text: String = resume_text.chars().take(MAX_PROMPT_CHARS).collect();
    RESUME_PARSE_PROMPT.replace("{resume_text}", &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_parse_prompt("Rust developer, 2nd year");
        assert!(prompt.contains("Rust developer, 2nd year"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_prompt_truncates_long_resumes() {
        let long = "a".repeat(MAX_PROMPT_CHARS + 500);
        let prompt = build_parse_prompt(&long);
        assert!(prompt.len() < RESUME_PARSE_PROMPT.len() + MAX_PROMPT_CHARS);
    }
}
