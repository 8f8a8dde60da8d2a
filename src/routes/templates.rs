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
    dto::stage_dto::{CreateTemplatePayload, UpdateTemplatePayload},
    error::Result,
    middleware::auth::AuthUser,
    AppState,
};

pub async fn list_templates(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let templates = state.template_service.list(user.user_id).await?;
    Ok(Json(templates))
}

pub async fn create_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let template = state
        .template_service
        .create(user.user_id, &payload.title, &payload.body, payload.position)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplatePayload>,
) -> Result<impl IntoResponse> {
    let template = state
        .template_service
        .update(
            id,
            user.user_id,
            payload.title.as_deref(),
            payload.body.as_deref(),
            payload.position,
        )
        .await?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.template_service.delete(id, user.user_id).await?;
    Ok(Json(json!({ "ok": true })))
}
