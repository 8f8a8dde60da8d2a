use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const KIND_RELATIVE: &str = "relative";
pub const KIND_ABSOLUTE: &str = "absolute";

/// One per-stage messaging rule. Relative rules carry only an offset
/// from stage entry; absolute rules carry a local date, time-of-day and
/// IANA zone and ignore when the recruit entered the stage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StageSequence {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub stage_id: Uuid,
    pub template_id: Uuid,
    pub kind: String,
    pub offset_minutes: Option<i32>,
    pub send_date: Option<NaiveDate>,
    pub send_time: Option<NaiveTime>,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
}
