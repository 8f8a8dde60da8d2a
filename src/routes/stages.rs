use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::stage_dto::{CreateSequencePayload, CreateStagePayload, UpdateStagePayload},
    error::Result,
    middleware::auth::AuthUser,
    AppState,
};

pub async fn list_stages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let stages = state.stage_service.list(user.user_id).await?;
    Ok(Json(stages))
}

pub async fn create_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateStagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let stage = state
        .stage_service
        .create(user.user_id, &payload.name, payload.position)
        .await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

pub async fn update_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<impl IntoResponse> {
    let stage = state
        .stage_service
        .update(id, user.user_id, payload.name.as_deref(), payload.position)
        .await?;
    Ok(Json(stage))
}

pub async fn delete_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.stage_service.delete(id, user.user_id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn list_sequences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(stage_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.stage_service.get_owned(stage_id, user.user_id).await?;
    let rules = state
        .stage_service
        .list_sequences(stage_id, user.user_id)
        .await?;
    Ok(Json(rules))
}

pub async fn create_sequence(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(stage_id): Path<Uuid>,
    Json(payload): Json<CreateSequencePayload>,
) -> Result<impl IntoResponse> {
    state.stage_service.get_owned(stage_id, user.user_id).await?;
    state
        .template_service
        .get_owned(payload.template_id, user.user_id)
        .await?;
    let rule = state
        .stage_service
        .create_sequence(
            user.user_id,
            stage_id,
            payload.template_id,
            &payload.kind,
            payload.offset_minutes,
            payload.send_date,
            payload.send_time,
            payload.timezone.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn delete_sequence(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.stage_service.delete_sequence(id, user.user_id).await?;
    Ok(Json(json!({ "ok": true })))
}
