use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_CANCELLED: &str = "cancelled";

/// A concrete scheduled send, produced from one sequence rule for one
/// recruit. `(recruit_id, sequence_id)` is unique: re-entering a stage
/// reschedules the existing row instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Followup {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub recruit_id: Uuid,
    pub stage_id: Uuid,
    pub template_id: Uuid,
    pub sequence_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub status: String,
    pub attempt_count: i32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
