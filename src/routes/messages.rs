use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::message_dto::{SendMessagePayload, SendMessageResponse},
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::message::{CreateMessage, DIRECTION_OUTBOUND},
    AppState,
};

/// Manual send from the UI. The body goes out as written, but still
/// passes the dispatcher's validation and placeholder gates.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let recruit = state
        .recruit_service
        .get_owned(payload.recruit_id, user.user_id)
        .await?;
    let to = recruit
        .phone
        .as_deref()
        .ok_or_else(|| Error::BadRequest("Recruit has no phone number".to_string()))?;

    // Keeps future renders stable by pinning the sender identity now.
    state
        .profile_service
        .ensure(user.user_id, &user.email)
        .await?;

    let receipt = state
        .dispatch_service
        .send(to, payload.body.trim(), recruit.id)
        .await?;

    state
        .message_service
        .create(CreateMessage {
            owner_id: user.user_id,
            recruit_id: recruit.id,
            direction: DIRECTION_OUTBOUND.to_string(),
            body: payload.body.trim().to_string(),
            provider_sid: Some(receipt.sid.clone()),
            from_phone: state.dispatch_service.from_phone(),
            to_phone: crate::utils::phone::normalize(Some(to)).unwrap_or_default(),
            status: receipt.status,
        })
        .await?;

    Ok(Json(SendMessageResponse {
        ok: true,
        sid: receipt.sid,
    }))
}

/// Thread for one recruit, oldest first. Viewing advances the caller's
/// read cursor.
pub async fn get_thread(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(recruit_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    // Ownership check before touching the thread.
    state
        .recruit_service
        .get_owned(recruit_id, user.user_id)
        .await?;

    let messages = state
        .message_service
        .get_thread(recruit_id, user.user_id)
        .await?;
    if let Err(e) = state
        .message_service
        .mark_thread_read(recruit_id, user.user_id)
        .await
    {
        tracing::warn!(error = %e, %recruit_id, "failed to advance read cursor");
    }
    Ok(Json(messages))
}

pub async fn get_unread(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let threads = state.message_service.unread_by_thread(user.user_id).await?;
    let total: i64 = threads.iter().map(|t| t.unread_count).sum();
    Ok(Json(json!({ "total": total, "threads": threads })))
}
