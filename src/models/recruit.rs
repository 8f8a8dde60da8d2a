use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recruit {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub stage_id: Option<Uuid>,
    pub notes: Option<String>,
    pub notes_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
