// src/models/student.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::validate_not_blank;

/// Score for one subject, shown next to a leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub name: String,
    pub score: f64,
}

/// A student on the class roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub section: String,

    /// Overall progress, expected in 0..=100 but not enforced.
    pub progress: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,

    /// Attendance percentage.
    #[serde(default)]
    pub attendance: f64,

    #[serde(default)]
    pub areas_of_concern: Vec<String>,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_scores: Vec<SubjectScore>,
}

/// DTO for adding a student.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudent {
    #[validate(length(min = 1, max = 100))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub grade: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub section: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub attendance: f64,
    #[serde(default)]
    pub areas_of_concern: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[validate(length(max = 500))]
    pub avatar: Option<String>,
    #[serde(default)]
    pub subject_scores: Vec<SubjectScore>,
}

/// DTO for updating a student. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StudentPatch {
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub name: Option<String>,
    #[validate(length(max = 10))]
    pub grade: Option<String>,
    #[validate(length(max = 10))]
    pub section: Option<String>,
    pub progress: Option<f64>,
    pub attendance: Option<f64>,
    pub areas_of_concern: Option<Vec<String>>,
    pub strengths: Option<Vec<String>>,
    #[validate(length(max = 500))]
    pub avatar: Option<String>,
    pub subject_scores: Option<Vec<SubjectScore>>,
}

impl StudentPatch {
    /// Whether applying this patch can move the student on the leaderboard.
    pub fn touches_ranking(&self) -> bool {
        self.progress.is_some()
    }
}

/// Input row for leaderboard ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<SubjectScore>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Up,
    Down,
    None,
}

/// A display-ready leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    /// 1-based position after sorting.
    pub rank: u32,
    /// `previous_rank - rank`; positive means the participant moved up.
    pub movement: i64,
    pub direction: Movement,
}
