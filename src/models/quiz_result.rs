// src/models/quiz_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best result of a learner on one quiz.
/// Stored in the `quiz_results` collection under `{user_id}:{quiz_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub user_id: String,
    pub quiz_id: String,
    pub quiz_title: String,
    pub subject: String,
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn document_id(user_id: &str, quiz_id: &str) -> String {
        format!("{}:{}", user_id, quiz_id)
    }
}

/// DTO for selecting an answer option.
#[derive(Debug, Deserialize)]
pub struct SelectOptionRequest {
    pub option: usize,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Default, Deserialize)]
pub struct QuizListParams {
    pub subject: Option<String>,
    pub q: Option<String>,
}
