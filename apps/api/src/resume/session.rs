//! Upload sessions: the parsed résumé is parked in Redis between the upload
//! and the confirm step, keyed by the upload id the client receives.

use chrono::{DateTime, Utc};
use redis::Client as RedisClient;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::ParsedResume;

const SESSION_KEY_PREFIX: &str = "pointblank:upload:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    pub id: Uuid,
    pub file_name: String,
    pub resume_key: String,
    pub resume_url: String,
    pub parsed: ParsedResume,
    pub uploaded_at: DateTime<Utc>,
}

pub fn session_key(id: Uuid) -> String {
    format!("{SESSION_KEY_PREFIX}{id}")
}

pub async fn save_session(
    redis: &RedisClient,
    session: &UploadSession,
    ttl_secs: u64,
) -> Result<(), AppError> {
    let payload = serde_json::to_string(session)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode upload session: {e}")))?;

    let mut con = redis.get_multiplexed_async_connection().await?;
    redis::cmd("SET")
        .arg(session_key(session.id))
        .arg(payload)
        .arg("EX")
        .arg(ttl_secs)
        .query_async::<_, ()>(&mut con)
        .await?;

    Ok(())
}

/// Returns `None` when the session never existed or has expired.
pub async fn load_session(redis: &RedisClient, id: Uuid) -> Result<Option<UploadSession>, AppError> {
    let mut con = redis.get_multiplexed_async_connection().await?;
    let payload: Option<String> = redis::cmd("GET")
        .arg(session_key(id))
        .query_async(&mut con)
        .await?;

    payload
        .map(|p| {
            serde_json::from_str(&p).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Corrupt upload session {id}: {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::analyzer::ParseSource;

    #[test]
    fn test_session_key_is_namespaced() {
        let id = Uuid::nil();
        assert_eq!(
            session_key(id),
            "pointblank:upload:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_session_survives_json() {
        let session = UploadSession {
            id: Uuid::new_v4(),
            file_name: "cv.pdf".into(),
            resume_key: "resumes/x.pdf".into(),
            resume_url: "http://localhost:9000/resumes/resumes/x.pdf".into(),
            parsed: ParsedResume {
                skills: vec!["Rust".into()],
                domain: None,
                year: Some(2),
                achievements: vec![],
                parsed_by: ParseSource::Keyword,
            },
            uploaded_at: Utc::now(),
        };
        let decoded: UploadSession =
            serde_json::from_str(&serde_json::to_string(&session).unwrap()).unwrap();
        assert_eq!(decoded.parsed, session.parsed);
        assert_eq!(decoded.resume_key, session.resume_key);
    }
}
