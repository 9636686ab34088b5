// src/models/analytics.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{question::Question, validate_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Assessment,
    Material,
    Progress,
}

/// Entry of the class recent-activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    pub time: DateTime<Utc>,
    pub description: String,
}

impl Activity {
    pub fn now(activity_type: ActivityType, title: &str, description: String) -> Self {
        Self {
            id: format!("act-{}", uuid::Uuid::new_v4().simple()),
            activity_type,
            title: title.to_string(),
            time: Utc::now(),
            description,
        }
    }
}

/// DTO for logging a custom activity.
#[derive(Debug, Deserialize, Validate)]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Draft,
    Published,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Share of the class that has completed it, in percent.
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub assessment_type: Option<String>,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_assessment_status() -> AssessmentStatus {
    AssessmentStatus::Draft
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAssessment {
    #[validate(length(min = 1, max = 100))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub title: String,
    pub date: NaiveDate,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub subject: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub assessment_type: Option<String>,
    #[serde(default = "default_assessment_status")]
    pub status: AssessmentStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AssessmentPatch {
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub progress: Option<f64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub subject: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub assessment_type: Option<String>,
    pub status: Option<AssessmentStatus>,
    pub questions: Option<Vec<Question>>,
}

/// Compact view used in `ClassAnalytics::upcoming_assessments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingAssessment {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub progress: f64,
}

/// Student counts per progress band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceBands {
    /// progress < 65
    pub low: usize,
    /// 65 <= progress <= 85
    pub medium: usize,
    /// progress > 85
    pub high: usize,
    /// attendance < 80
    pub attendance_issues: usize,
}

/// Derived class-wide figures. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAnalytics {
    pub student_count: usize,
    pub average_progress: f64,
    pub attendance_rate: f64,
    pub topics_trouble: Vec<String>,
    pub topics_excel: Vec<String>,
    pub performance: PerformanceBands,
    pub upcoming_assessments: Vec<UpcomingAssessment>,
    pub recent_activity: Vec<Activity>,
}
