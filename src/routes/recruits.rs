use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::recruit_dto::{
        ChangeStagePayload, CreateRecruitPayload, StageChangeResponse, UpdateNotesPayload,
    },
    error::Result,
    middleware::auth::AuthUser,
    AppState,
};

pub async fn create_recruit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateRecruitPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let recruit = state
        .recruit_service
        .create(
            user.user_id,
            &payload.first_name,
            payload.last_name.as_deref().unwrap_or(""),
            payload.phone.as_deref(),
            payload.stage_id,
            payload.notes.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(recruit)))
}

pub async fn list_recruits(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let recruits = state.recruit_service.list(user.user_id).await?;
    Ok(Json(recruits))
}

pub async fn get_recruit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let recruit = state.recruit_service.get_owned(id, user.user_id).await?;
    Ok(Json(recruit))
}

pub async fn update_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNotesPayload>,
) -> Result<impl IntoResponse> {
    let recruit = state
        .recruit_service
        .update_notes(id, user.user_id, &payload.notes)
        .await?;
    Ok(Json(recruit))
}

pub async fn delete_recruit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .recruit_service
        .delete(id, user.user_id, user.is_admin())
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Moves a recruit to a new stage and reschedules its automated
/// follow-ups accordingly.
pub async fn change_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStagePayload>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .schedule_service
        .change_stage(id, payload.stage_id, user.user_id)
        .await?;
    let reason = (!outcome.terminal && outcome.created == 0)
        .then(|| "no sequences".to_string());
    Ok(Json(StageChangeResponse {
        ok: true,
        cancelled_old: outcome.cancelled_old,
        created: outcome.created,
        terminal: outcome.terminal,
        reason,
    }))
}

/// CSV export of the caller's recruits.
pub async fn export_recruits(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let recruits = state.recruit_service.list(user.user_id).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "first_name",
            "last_name",
            "phone",
            "stage_id",
            "notes",
            "created_at",
        ])
        .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
    for r in &recruits {
        let record = [
            r.first_name.clone(),
            r.last_name.clone(),
            r.phone.clone().unwrap_or_default(),
            r.stage_id.map(|s| s.to_string()).unwrap_or_default(),
            r.notes.clone().unwrap_or_default(),
            r.created_at.to_rfc3339(),
        ];
        writer
            .write_record(&record)
            .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|e| crate::error::Error::Internal(e.to_string()))?;

    let filename = format!("recruits_{}.csv", chrono::Utc::now().format("%Y%m%d"));
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
