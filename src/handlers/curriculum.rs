// src/handlers/curriculum.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{error::AppError, models::curriculum::CurriculumParams, state::AppState};

/// Subjects and their topics, optionally narrowed by `q`.
pub async fn get_overview(
    State(state): State<AppState>,
    Query(params): Query<CurriculumParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.curriculum.overview(params.q.as_deref())))
}

pub async fn get_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let subject = state.curriculum.subject(&subject)?;
    Ok(Json(subject.clone()))
}

/// Syllabus content for one topic along with the quizzes that cover it.
pub async fn get_topic(
    State(state): State<AppState>,
    Path((subject, topic)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .curriculum
        .topic_detail(&subject, &topic, &state.catalog)?;
    Ok(Json(detail))
}
