use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DIRECTION_INBOUND: &str = "inbound";
pub const DIRECTION_OUTBOUND: &str = "outbound";

/// Append-only log entry for one SMS, sent or received. Rows are never
/// mutated; read state lives in the per-thread cursor instead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub recruit_id: Uuid,
    pub direction: String,
    pub body: String,
    pub provider_sid: Option<String>,
    pub from_phone: String,
    pub to_phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub owner_id: Uuid,
    pub recruit_id: Uuid,
    pub direction: String,
    pub body: String,
    pub provider_sid: Option<String>,
    pub from_phone: String,
    pub to_phone: String,
    pub status: String,
}

/// Unread state for one (owner, recruit) thread, derived against the
/// read cursor.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ThreadUnread {
    pub recruit_id: Uuid,
    pub unread_count: i64,
}
