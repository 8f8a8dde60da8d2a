use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessagePayload {
    pub recruit_id: uuid::Uuid,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    pub sid: String,
}

/// Provider callback for an inbound SMS, form-encoded with the
/// provider's capitalized field names.
#[derive(Debug, Deserialize)]
pub struct InboundSmsForm {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}
