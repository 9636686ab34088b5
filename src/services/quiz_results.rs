// src/services/quiz_results.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    database::{self, DocumentStore, QUIZ_RESULTS},
    error::AppError,
    models::{question::Quiz, quiz_result::QuizResult},
    services::quiz_engine::QuizOutcome,
};

/// Best score per (user, quiz), plus how often the quiz was completed.
pub struct QuizResultStore {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl QuizResultStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Counts the attempt and keeps the higher of the stored and new score.
    pub async fn record(
        &self,
        user_id: &str,
        quiz: &Quiz,
        outcome: QuizOutcome,
        now: DateTime<Utc>,
    ) -> Result<QuizResult, AppError> {
        let _guard = self.write_lock.lock().await;
        let doc_id = QuizResult::document_id(user_id, &quiz.id);

        let previous: Option<QuizResult> =
            database::get_as(self.store.as_ref(), QUIZ_RESULTS, &doc_id).await?;

        let result = match previous {
            Some(mut best) => {
                best.attempts += 1;
                if outcome.percentage() >= best.percentage {
                    best.score = outcome.score;
                    best.total = outcome.total;
                    best.percentage = outcome.percentage();
                    best.completed_at = now;
                }
                best.quiz_title = quiz.title.clone();
                best
            }
            None => QuizResult {
                user_id: user_id.to_string(),
                quiz_id: quiz.id.clone(),
                quiz_title: quiz.title.clone(),
                subject: quiz.subject.clone(),
                score: outcome.score,
                total: outcome.total,
                percentage: outcome.percentage(),
                attempts: 1,
                completed_at: now,
            },
        };

        database::put_as(self.store.as_ref(), QUIZ_RESULTS, &doc_id, &result).await?;
        tracing::info!(
            "Recorded quiz result for {} on '{}': {}/{}",
            user_id,
            quiz.id,
            outcome.score,
            outcome.total
        );
        Ok(result)
    }

    /// Results of one user, most recent first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<QuizResult>, AppError> {
        let mut results: Vec<QuizResult> = database::list_as(self.store.as_ref(), QUIZ_RESULTS)
            .await?
            .into_iter()
            .filter(|r: &QuizResult| r.user_id == user_id)
            .collect();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }
}
