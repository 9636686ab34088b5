// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::{PublicQuiz, Quiz},
        quiz_result::{QuizListParams, QuizResult, SelectOptionRequest},
    },
    services::{
        quiz_catalog::QuizCatalog,
        quiz_engine::QuizOutcome,
        quiz_sessions::{QuizSession, SessionView},
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Session state after a step. `recorded` is set on the step that
/// finished the quiz once the result is stored; `record_error` is set
/// instead when storing failed and the result waits for a retry.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    #[serde(flatten)]
    pub session: SessionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<QuizResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_error: Option<String>,
}

impl From<SessionView> for StepResponse {
    fn from(session: SessionView) -> Self {
        Self {
            session,
            recorded: None,
            record_error: None,
        }
    }
}

/// List the quiz catalog, optionally filtered by subject and search text.
pub async fn list_quizzes(
    State(catalog): State<Arc<QuizCatalog>>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = catalog.list(params.subject.as_deref(), params.q.as_deref());
    Ok(Json(quizzes))
}

/// Quiz details with answers hidden.
pub async fn get_quiz(
    State(catalog): State<Arc<QuizCatalog>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = catalog.get(&id)?;
    Ok(Json(PublicQuiz::from(quiz.as_ref())))
}

/// Starts a fresh attempt. Any live attempt of the caller on the same
/// quiz is discarded.
pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state.catalog.get(&id)?;
    let view = state.sessions.start(&claims.sub, quiz).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.sessions.view(session_id, &claims.sub).await?;
    Ok(Json(view))
}

pub async fn select_option(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .sessions
        .with_session(session_id, &claims.sub, |s| {
            s.engine.select(payload.option)?;
            Ok(s.view())
        })
        .await?;
    Ok(Json(view))
}

/// Records the candidate answer. Without a candidate this changes nothing.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .sessions
        .with_session(session_id, &claims.sub, |s| {
            s.engine.submit();
            Ok(s.view())
        })
        .await?;
    Ok(Json(view))
}

/// Moves forward. Leaving the last question finishes the quiz and stores
/// the result. When storing fails the attempt still completes, the
/// response carries `record_error` and the outcome stays on the session.
pub async fn next_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (view, finished): (SessionView, Option<(Arc<Quiz>, QuizOutcome)>) = state
        .sessions
        .with_session(session_id, &claims.sub, |s: &mut QuizSession| {
            let outcome = s.engine.next();
            Ok((s.view(), outcome.map(|o| (s.quiz.clone(), o))))
        })
        .await?;

    let mut response = StepResponse::from(view);
    if let Some((quiz, outcome)) = finished {
        tracing::info!(
            "User {} finished quiz '{}' with {}/{}",
            claims.sub,
            quiz.id,
            outcome.score,
            outcome.total
        );
        match store_result(&state, &claims.sub, session_id, &quiz, outcome).await {
            Ok(result) => response.recorded = Some(result),
            Err(_) => {
                response.session.result_pending = true;
                response.record_error = Some(format!(
                    "Quiz result could not be saved. Retry with POST /api/sessions/{}/record",
                    session_id
                ));
            }
        }
    }

    Ok(Json(response))
}

/// Stores the result a previous completion could not save.
pub async fn record_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (quiz, outcome) = state
        .sessions
        .with_session(session_id, &claims.sub, |s| {
            let outcome = s.pending_result.take().ok_or_else(|| {
                AppError::ValidationError("No unsaved result for this session".to_string())
            })?;
            Ok((s.quiz.clone(), outcome))
        })
        .await?;

    let result = store_result(&state, &claims.sub, session_id, &quiz, outcome).await?;
    let view = state.sessions.view(session_id, &claims.sub).await?;

    Ok(Json(StepResponse {
        session: view,
        recorded: Some(result),
        record_error: None,
    }))
}

/// Writes the outcome; on failure it is put back on the session.
async fn store_result(
    state: &AppState,
    user_id: &str,
    session_id: Uuid,
    quiz: &Quiz,
    outcome: QuizOutcome,
) -> Result<QuizResult, AppError> {
    match state.results.record(user_id, quiz, outcome, Utc::now()).await {
        Ok(result) => Ok(result),
        Err(e) => {
            tracing::error!(
                "Failed to store result of quiz '{}' for {}: {}",
                quiz.id,
                user_id,
                e
            );
            let held = state
                .sessions
                .with_session(session_id, user_id, |s| {
                    s.hold_result(outcome);
                    Ok(())
                })
                .await;
            if held.is_err() {
                tracing::error!("Session {} is gone, quiz result dropped", session_id);
            }
            Err(e)
        }
    }
}

pub async fn previous_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .sessions
        .with_session(session_id, &claims.sub, |s| {
            s.engine.previous();
            Ok(s.view())
        })
        .await?;
    Ok(Json(view))
}

/// Starts the same quiz over within the session.
pub async fn reset_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .sessions
        .with_session(session_id, &claims.sub, |s| {
            s.engine.reset();
            Ok(s.view())
        })
        .await?;
    Ok(Json(view))
}

/// Per-question review, available once the quiz is completed.
pub async fn review_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let review = state
        .sessions
        .with_session(session_id, &claims.sub, |s| {
            if !s.engine.is_completed() {
                return Err(AppError::ValidationError(
                    "Review is available after the last question".to_string(),
                ));
            }
            Ok(s.engine.review())
        })
        .await?;
    Ok(Json(review))
}
