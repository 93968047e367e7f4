use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::resume::ResumeAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Upload sessions and the email outbox.
    pub redis: RedisClient,
    /// Original résumé PDFs.
    pub s3: S3Client,
    pub config: Config,
    /// Keyword analyzer, or the LLM analyzer when ENABLE_LLM_PARSING is set.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}
