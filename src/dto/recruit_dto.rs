use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecruitPayload {
    #[validate(length(min = 1))]
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub stage_id: Option<uuid::Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNotesPayload {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStagePayload {
    pub stage_id: uuid::Uuid,
}

#[derive(Debug, Serialize)]
pub struct StageChangeResponse {
    pub ok: bool,
    pub cancelled_old: bool,
    pub created: i64,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
