// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single multiple-choice question.
/// Immutable once loaded into a quiz or an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1, max = 100))]
    pub id: String,

    /// The prompt shown to the learner.
    #[validate(length(min = 1, max = 1000))]
    pub question: String,

    /// Answer options, displayed in order (A, B, C, ...).
    #[validate(length(min = 2, max = 10), custom(function = validate_options))]
    pub options: Vec<String>,

    /// Index into `options`.
    pub correct_answer: usize,

    #[validate(length(max = 2000))]
    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<u32>,
}

impl Question {
    /// Field checks plus the answer-key invariant.
    pub fn ensure_valid(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::ValidationError(format!("question '{}': {}", self.id, e)))?;

        if self.correct_answer >= self.options.len() {
            return Err(AppError::ValidationError(format!(
                "question '{}': correct_answer {} is out of range for {} options",
                self.id,
                self.correct_answer,
                self.options.len()
            )));
        }

        Ok(())
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer]
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// Checks every question of a set and rejects duplicate ids.
pub fn validate_question_set(questions: &[Question]) -> Result<(), AppError> {
    let mut seen = std::collections::HashSet::new();
    for question in questions {
        question.ensure_valid()?;
        if !seen.insert(question.id.as_str()) {
            return Err(AppError::ValidationError(format!(
                "duplicate question id '{}'",
                question.id
            )));
        }
    }
    Ok(())
}

/// DTO for sending a question to the learner (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

/// A quiz definition from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Subject id, e.g. `math` or `science`.
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn ensure_valid(&self) -> Result<(), AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::ValidationError("quiz id cannot be empty".to_string()));
        }
        if self.questions.is_empty() {
            return Err(AppError::ValidationError(format!(
                "quiz '{}' has no questions",
                self.id
            )));
        }
        validate_question_set(&self.questions)
            .map_err(|e| AppError::ValidationError(format!("quiz '{}': {}", self.id, e)))
    }
}

/// Listing row for the quiz catalog.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    pub question_count: usize,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            subject: quiz.subject.clone(),
            topic: quiz.topic.clone(),
            difficulty: quiz.difficulty.clone(),
            question_count: quiz.questions.len(),
        }
    }
}

/// Quiz as served before an attempt starts: answers stay hidden.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    #[serde(flatten)]
    pub summary: QuizSummary,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Quiz> for PublicQuiz {
    fn from(quiz: &Quiz) -> Self {
        Self {
            summary: QuizSummary::from(quiz),
            questions: quiz.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}
