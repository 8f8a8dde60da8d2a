use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStagePayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStagePayload {
    pub name: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplatePayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub position: Option<i32>,
}

/// A sequence rule is either relative (offset only) or absolute (date,
/// time-of-day and IANA zone, all three required). Cross-field checks
/// live in the handler since they span the discriminator.
#[derive(Debug, Deserialize)]
pub struct CreateSequencePayload {
    pub template_id: uuid::Uuid,
    pub kind: String,
    pub offset_minutes: Option<i32>,
    pub send_date: Option<NaiveDate>,
    pub send_time: Option<NaiveTime>,
    pub timezone: Option<String>,
}
