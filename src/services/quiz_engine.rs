// src/services/quiz_engine.rs

//! Single-learner quiz attempt.
//!
//! The engine walks an ordered question list one question at a time:
//! the learner picks a candidate option, submits it to reveal correctness
//! and the explanation, then moves on. The score counts correct
//! submissions, one point each. Going back never re-scores.

use serde::Serialize;

use crate::{
    error::AppError,
    models::question::{PublicQuestion, Question, validate_question_set},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum QuizPhase {
    /// Waiting for the learner to pick and submit an option for question `i`.
    Answering(usize),
    /// Question `i` has a recorded answer; correctness and explanation are shown.
    Revealed(usize),
    Completed,
}

/// Emitted once when the last question is left via `next()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    pub score: usize,
    pub total: usize,
}

impl QuizOutcome {
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    pub fn tier(&self) -> FeedbackTier {
        FeedbackTier::from_percentage(self.percentage())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Great,
    GoodEffort,
    KeepPracticing,
}

impl FeedbackTier {
    /// Lower bounds are inclusive: 90, 70, 50.
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => FeedbackTier::Excellent,
            70..=89 => FeedbackTier::Great,
            50..=69 => FeedbackTier::GoodEffort,
            _ => FeedbackTier::KeepPracticing,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent! You've mastered this topic.",
            FeedbackTier::Great => "Great job! You have a good understanding of this topic.",
            FeedbackTier::GoodEffort => {
                "Good effort! Review the areas you missed to improve further."
            }
            FeedbackTier::KeepPracticing => {
                "Keep practicing! We recommend reviewing this topic again."
            }
        }
    }
}

/// `round(score / total * 100)`, 0 for an empty quiz.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}

/// One row of the post-quiz review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub question_id: String,
    pub question: String,
    /// Text of the recorded answer, `None` when the question was not answered.
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Correctness feedback for the question currently on screen.
#[derive(Debug, Clone, Serialize)]
pub struct Reveal {
    pub is_correct: bool,
    pub correct_answer: usize,
    pub explanation: String,
}

/// Summary shown on the results screen.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub tier: FeedbackTier,
    pub feedback: &'static str,
}

impl From<QuizOutcome> for QuizSummary {
    fn from(outcome: QuizOutcome) -> Self {
        let tier = outcome.tier();
        Self {
            score: outcome.score,
            total: outcome.total,
            percentage: outcome.percentage(),
            tier,
            feedback: tier.message(),
        }
    }
}

/// Everything a client needs to render the current step.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    pub total: usize,
    pub score: usize,
    pub candidate: Option<usize>,
    /// Share of the quiz done, counting the current question once revealed.
    pub progress_percent: u32,
    pub question: Option<PublicQuestion>,
    pub reveal: Option<Reveal>,
    pub result: Option<QuizSummary>,
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    questions: Vec<Question>,
    phase: QuizPhase,
    candidate: Option<usize>,
    /// One slot per question, `None` until submitted.
    answers: Vec<Option<usize>>,
    /// Candidates left unsubmitted when the learner navigated back.
    drafts: Vec<Option<usize>>,
    score: usize,
    outcome_emitted: bool,
}

impl QuizEngine {
    /// Fails fast on an empty or malformed question set.
    pub fn new(questions: Vec<Question>) -> Result<Self, AppError> {
        if questions.is_empty() {
            return Err(AppError::ValidationError(
                "a quiz needs at least one question".to_string(),
            ));
        }
        validate_question_set(&questions)?;

        let len = questions.len();
        Ok(Self {
            questions,
            phase: QuizPhase::Answering(0),
            candidate: None,
            answers: vec![None; len],
            drafts: vec![None; len],
            score: 0,
            outcome_emitted: false,
        })
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn candidate(&self) -> Option<usize> {
        self.candidate
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn is_completed(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Answering(i) | QuizPhase::Revealed(i) => Some(i),
            QuizPhase::Completed => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().map(|i| &self.questions[i])
    }

    /// Stores `option` as the candidate for the current question.
    /// Ignored once the question is revealed or the quiz is completed.
    pub fn select(&mut self, option: usize) -> Result<(), AppError> {
        let QuizPhase::Answering(i) = self.phase else {
            return Ok(());
        };

        let options = self.questions[i].options.len();
        if option >= options {
            return Err(AppError::ValidationError(format!(
                "option {} is out of range for {} options",
                option, options
            )));
        }

        self.candidate = Some(option);
        Ok(())
    }

    /// Records the candidate and reveals the answer.
    /// Returns `false` without changing anything when there is nothing to submit.
    pub fn submit(&mut self) -> bool {
        let (QuizPhase::Answering(i), Some(choice)) = (self.phase, self.candidate) else {
            return false;
        };

        self.answers[i] = Some(choice);
        self.drafts[i] = None;
        if choice == self.questions[i].correct_answer {
            self.score += 1;
        }
        self.phase = QuizPhase::Revealed(i);
        true
    }

    /// Leaves a revealed question.
    /// Returns the outcome the first time the last question is left.
    pub fn next(&mut self) -> Option<QuizOutcome> {
        let QuizPhase::Revealed(i) = self.phase else {
            return None;
        };

        if i + 1 == self.questions.len() {
            self.phase = QuizPhase::Completed;
            self.candidate = None;
            if self.outcome_emitted {
                return None;
            }
            self.outcome_emitted = true;
            return Some(QuizOutcome {
                score: self.score,
                total: self.questions.len(),
            });
        }

        self.enter(i + 1);
        None
    }

    /// Steps back one question, restoring its recorded answer.
    /// Returns `false` on the first question or after completion.
    pub fn previous(&mut self) -> bool {
        let i = match self.phase {
            QuizPhase::Answering(i) if i > 0 => {
                self.drafts[i] = self.candidate;
                i
            }
            QuizPhase::Revealed(i) if i > 0 => i,
            _ => return false,
        };

        self.enter(i - 1);
        true
    }

    /// Starts a new attempt from the first question.
    pub fn reset(&mut self) {
        self.phase = QuizPhase::Answering(0);
        self.candidate = None;
        self.answers.iter_mut().for_each(|slot| *slot = None);
        self.drafts.iter_mut().for_each(|slot| *slot = None);
        self.score = 0;
        self.outcome_emitted = false;
    }

    fn enter(&mut self, index: usize) {
        match self.answers[index] {
            Some(answer) => {
                self.candidate = Some(answer);
                self.phase = QuizPhase::Revealed(index);
            }
            None => {
                self.candidate = self.drafts[index].take();
                self.phase = QuizPhase::Answering(index);
            }
        }
    }

    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.is_completed().then_some(QuizOutcome {
            score: self.score,
            total: self.questions.len(),
        })
    }

    pub fn review(&self) -> Vec<ReviewItem> {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(question, answer)| ReviewItem {
                question_id: question.id.clone(),
                question: question.question.clone(),
                your_answer: answer.map(|a| question.options[a].clone()),
                correct_answer: question.correct_option().to_string(),
                is_correct: *answer == Some(question.correct_answer),
            })
            .collect()
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        let total = self.questions.len();
        let (question, reveal, done) = match self.phase {
            QuizPhase::Answering(i) => (Some(PublicQuestion::from(&self.questions[i])), None, i),
            QuizPhase::Revealed(i) => {
                let q = &self.questions[i];
                let reveal = Reveal {
                    is_correct: self.answers[i] == Some(q.correct_answer),
                    correct_answer: q.correct_answer,
                    explanation: q.explanation.clone(),
                };
                (Some(PublicQuestion::from(q)), Some(reveal), i + 1)
            }
            QuizPhase::Completed => (None, None, total),
        };

        QuizSnapshot {
            phase: self.phase,
            total,
            score: self.score,
            candidate: self.candidate,
            progress_percent: percentage(done, total),
            question,
            reveal,
            result: self.outcome().map(QuizSummary::from),
        }
    }
}
