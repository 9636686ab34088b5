// src/services/quiz_sessions.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::{COMPLETED_SESSION_RETENTION_MINUTES, SESSION_IDLE_TTL_HOURS},
    error::AppError,
    models::question::Quiz,
    services::quiz_engine::{QuizEngine, QuizOutcome, QuizSnapshot},
};

/// A live quiz attempt, owned by one user.
#[derive(Debug)]
pub struct QuizSession {
    pub id: Uuid,
    pub user_id: String,
    pub quiz: Arc<Quiz>,
    pub engine: QuizEngine,
    pub started_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    /// Outcome of a finished attempt that could not be stored yet.
    pub pending_result: Option<QuizOutcome>,
}

impl QuizSession {
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            quiz_id: self.quiz.id.clone(),
            quiz_title: self.quiz.title.clone(),
            started_at: self.started_at,
            result_pending: self.pending_result.is_some(),
            state: self.engine.snapshot(),
        }
    }

    /// Keeps an unsaved outcome for a later retry. An outcome already
    /// waiting is not replaced.
    pub fn hold_result(&mut self, outcome: QuizOutcome) {
        self.pending_result.get_or_insert(outcome);
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.pending_result.is_some() {
            return false;
        }
        let idle = now - self.last_active_at;
        idle > Duration::hours(SESSION_IDLE_TTL_HOURS)
            || (self.engine.is_completed()
                && idle > Duration::minutes(COMPLETED_SESSION_RETENTION_MINUTES))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub quiz_id: String,
    pub quiz_title: String,
    pub started_at: DateTime<Utc>,
    pub result_pending: bool,
    #[serde(flatten)]
    pub state: QuizSnapshot,
}

/// In-process registry of quiz attempts.
///
/// A user has at most one live session per quiz; starting again replaces it.
/// Idle and long-finished sessions are dropped whenever a new one starts,
/// except those still holding an unsaved result.
#[derive(Debug, Default)]
pub struct QuizSessions {
    sessions: RwLock<HashMap<Uuid, QuizSession>>,
}

impl QuizSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, user_id: &str, quiz: Arc<Quiz>) -> Result<SessionView, AppError> {
        let engine = QuizEngine::new(quiz.questions.clone())?;
        let now = Utc::now();
        let mut session = QuizSession {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            quiz,
            engine,
            started_at: now,
            last_active_at: now,
            pending_result: None,
        };

        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, now);

        let replaced: Vec<Uuid> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.quiz.id == session.quiz.id)
            .map(|s| s.id)
            .collect();
        for id in replaced {
            // An unsaved result survives a restart of the same quiz.
            if let Some(old) = sessions.remove(&id) {
                if session.pending_result.is_none() {
                    session.pending_result = old.pending_result;
                }
            }
        }

        tracing::info!(
            "User {} started quiz '{}' (session {})",
            user_id,
            session.quiz.id,
            session.id
        );
        let view = session.view();
        sessions.insert(session.id, session);

        Ok(view)
    }

    pub async fn view(&self, session_id: Uuid, user_id: &str) -> Result<SessionView, AppError> {
        let sessions = self.sessions.read().await;
        let session = owned(sessions.get(&session_id), session_id, user_id)?;
        Ok(session.view())
    }

    /// Runs `f` against the caller's session under the write lock.
    /// Sessions of other users are reported as not found.
    pub async fn with_session<R>(
        &self,
        session_id: Uuid,
        user_id: &str,
        f: impl FnOnce(&mut QuizSession) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| not_found(session_id))?;
        session.last_active_at = Utc::now();
        f(session)
    }

    /// Drops sessions that expired by `now`. Returns how many were removed.
    pub async fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, now)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn prune_expired(sessions: &mut HashMap<Uuid, QuizSession>, now: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(now));
    let removed = before - sessions.len();
    if removed > 0 {
        tracing::debug!("Pruned {} expired quiz sessions", removed);
    }
    removed
}

fn owned<'a>(
    session: Option<&'a QuizSession>,
    session_id: Uuid,
    user_id: &str,
) -> Result<&'a QuizSession, AppError> {
    session
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| not_found(session_id))
}

fn not_found(session_id: Uuid) -> AppError {
    tracing::warn!("Quiz session {} not found", session_id);
    AppError::NotFound(format!("Quiz session '{}' not found", session_id))
}
