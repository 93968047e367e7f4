//! Outbound email queue.
//!
//! The API does not talk SMTP itself. Messages are serialized onto a Redis
//! list that a mail worker drains.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::member::MemberRow;

pub const OUTBOX_KEY: &str = "pointblank:outbox";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub id: Uuid,
    pub member_id: Uuid,
    pub from: String,
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

/// One message per member with a non-blank address.
pub fn build_messages(
    members: &[MemberRow],
    from: &str,
    subject: &str,
    body: &str,
) -> Vec<OutboundEmail> {
    let queued_at = Utc::now();
    members
        .iter()
        .filter(|m| !m.email.trim().is_empty())
        .map(|m| OutboundEmail {
            id: Uuid::new_v4(),
            member_id: m.id,
            from: from.to_string(),
            to: m.email.trim().to_string(),
            to_name: m.name.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
            queued_at,
        })
        .collect()
}

/// Appends all messages to the outbox in one round trip. Returns the count queued.
pub async fn enqueue(redis: &redis::Client, messages: &[OutboundEmail]) -> Result<usize> {
    if messages.is_empty() {
        return Ok(0);
    }

    let mut pipe = redis::pipe();
    for message in messages {
        pipe.rpush(OUTBOX_KEY, serde_json::to_string(message)?).ignore();
    }

    let mut con = redis.get_multiplexed_async_connection().await?;
    pipe.query_async::<_, ()>(&mut con).await?;
    Ok(messages.len())
}
