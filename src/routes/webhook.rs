use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Form,
};

use crate::{dto::message_dto::InboundSmsForm, AppState};

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// Inbound SMS callback from the provider. Whatever happens inside,
/// the provider gets a 200 with an empty TwiML document; anything else
/// triggers provider-side retry storms.
pub async fn handle_inbound_sms(
    State(state): State<AppState>,
    Form(form): Form<InboundSmsForm>,
) -> impl IntoResponse {
    if let Err(e) = state
        .inbound_service
        .handle_inbound(
            form.from.as_deref(),
            form.to.as_deref(),
            form.body.as_deref(),
            form.message_sid.as_deref(),
        )
        .await
    {
        tracing::error!(error = %e, "inbound sms processing failed");
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        EMPTY_TWIML,
    )
}
