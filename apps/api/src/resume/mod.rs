// Résumé intake: PDF upload, text extraction, analysis and the upload session
// the confirm step reads back. Model calls go through llm_client only.

pub mod analyzer;
pub mod extract;
pub mod handlers;
pub mod keywords;
pub mod prompts;
pub mod session;
pub mod storage;

pub use analyzer::{KeywordResumeAnalyzer, LlmResumeAnalyzer, ParsedResume, ResumeAnalyzer};
