use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use subtle::ConstantTimeEq;

use crate::{
    config::get_config,
    dto::cron_dto::CronQuery,
    error::{Error, Result},
    AppState,
};

/// Periodic trigger for the follow-up delivery loop. Authorized by a
/// shared secret in the `x-cron-secret` header or `secret` query
/// parameter. `debug=1` renders previews without sending or mutating.
pub async fn run_followups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<impl IntoResponse> {
    verify_secret(&headers, query.secret.as_deref())?;

    let config = get_config();
    let dry_run = query
        .debug
        .as_deref()
        .is_some_and(|d| d == "1" || d.eq_ignore_ascii_case("true"));
    let limit = query
        .limit
        .unwrap_or(config.delivery_batch_limit)
        .clamp(1, config.delivery_batch_limit);

    let summary = state
        .delivery_service
        .run_once(chrono::Utc::now(), limit, dry_run)
        .await?;

    Ok(Json(summary))
}

fn verify_secret(headers: &HeaderMap, query_secret: Option<&str>) -> Result<()> {
    let expected = &get_config().cron_secret;
    if expected.is_empty() {
        return Err(Error::Config("CRON_SECRET is not configured".to_string()));
    }

    let provided = headers
        .get("x-cron-secret")
        .and_then(|v| v.to_str().ok())
        .or(query_secret)
        .ok_or_else(|| Error::Unauthorized("missing_cron_secret".to_string()))?;

    if ConstantTimeEq::ct_eq(provided.as_bytes(), expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(Error::Unauthorized("invalid_cron_secret".to_string()))
    }
}
