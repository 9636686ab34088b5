use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Weekday;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{ProfilePatch, SubjectProgressRequest},
    services::profile_store::ProfileStore,
    state::AppState,
    utils::jwt::Claims,
};

/// Get the current user's profile, creating it on first access.
pub async fn get_me(
    State(profiles): State<Arc<ProfileStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profiles.load_or_init(&claims.identity()).await?;
    Ok(Json(profile))
}

/// Partially update the current user's profile.
pub async fn update_me(
    State(profiles): State<Arc<ProfileStore>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProfilePatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    profiles.load_or_init(&claims.identity()).await?;
    let profile = profiles.update(&claims.sub, payload).await?;
    Ok(Json(profile))
}

pub async fn update_subject_progress(
    State(profiles): State<Arc<ProfileStore>>,
    Extension(claims): Extension<Claims>,
    Path(subject_id): Path<String>,
    Json(payload): Json<SubjectProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    profiles.load_or_init(&claims.identity()).await?;
    let subject = profiles
        .update_subject_progress(&claims.sub, &subject_id, payload.progress)
        .await?;
    Ok(Json(subject))
}

/// Timetable for one weekday (`monday`, `mon`, ...). Sunday is empty.
pub async fn get_schedule(
    State(profiles): State<Arc<ProfileStore>>,
    Extension(claims): Extension<Claims>,
    Path(day): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let weekday = day
        .parse::<Weekday>()
        .map_err(|_| AppError::ValidationError(format!("Unknown weekday '{}'", day)))?;

    profiles.load_or_init(&claims.identity()).await?;
    let periods = profiles.schedule(&claims.sub, weekday).await?;
    Ok(Json(periods))
}

/// Best result per quiz of the current user.
pub async fn list_my_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.results.list_for_user(&claims.sub).await?;
    Ok(Json(results))
}
