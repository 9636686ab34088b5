// src/models/user.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::validate_not_blank;

static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid regex"));

/// Selects the dashboard variant. Fixed for the lifetime of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

/// What the auth provider tells us about the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

/// Progress of the user in one curriculum subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    pub color_var: String,
    pub icon: String,
    pub total_topics: u32,
    pub completed_topics: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SchedulePeriod {
    #[validate(length(min = 1, max = 50))]
    pub id: String,
    #[validate(length(min = 1, max = 50))]
    pub subject: String,
    #[validate(regex(path = *TIME_OF_DAY))]
    pub start_time: String,
    #[validate(regex(path = *TIME_OF_DAY))]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScheduleDay {
    #[validate(nested)]
    pub periods: Vec<SchedulePeriod>,
}

/// Monday to Saturday timetable. Sunday has no periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeeklySchedule {
    #[validate(nested)]
    pub monday: ScheduleDay,
    #[validate(nested)]
    pub tuesday: ScheduleDay,
    #[validate(nested)]
    pub wednesday: ScheduleDay,
    #[validate(nested)]
    pub thursday: ScheduleDay,
    #[validate(nested)]
    pub friday: ScheduleDay,
    #[validate(nested)]
    pub saturday: ScheduleDay,
}

impl WeeklySchedule {
    pub fn day(&self, weekday: Weekday) -> &[SchedulePeriod] {
        match weekday {
            Weekday::Mon => &self.monday.periods,
            Weekday::Tue => &self.tuesday.periods,
            Weekday::Wed => &self.wednesday.periods,
            Weekday::Thu => &self.thursday.periods,
            Weekday::Fri => &self.friday.periods,
            Weekday::Sat => &self.saturday.periods,
            Weekday::Sun => &[],
        }
    }
}

/// The per-user profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default)]
    pub subjects: Vec<SubjectProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_schedule: Option<WeeklySchedule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
}

impl UserProfile {
    /// Fresh profile for a first sign-in, seeded with the Std X curriculum.
    pub fn new_for(identity: &Identity, now: DateTime<Utc>) -> Self {
        let display_name = if identity.display_name.trim().is_empty() {
            match identity.role {
                Role::Student => "Student".to_string(),
                Role::Teacher => "Teacher".to_string(),
            }
        } else {
            identity.display_name.clone()
        };

        Self {
            uid: identity.uid.clone(),
            display_name,
            email: identity.email.clone(),
            role: identity.role,
            school: Some("Std X School".to_string()),
            grade: Some("10".to_string()),
            division: Some("A".to_string()),
            board: Some("Maharashtra State Board".to_string()),
            subjects: default_subjects(),
            weekly_schedule: Some(default_weekly_schedule()),
            created_at: now,
            updated_at: now,
            photo_url: None,
            phone_number: None,
            address: None,
            parent_name: None,
            parent_contact: None,
            admission_number: None,
            roll_number: None,
        }
    }
}

/// DTO for updating the caller's profile. Identity fields are not editable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub display_name: Option<String>,
    #[validate(length(max = 200))]
    pub school: Option<String>,
    #[validate(length(max = 10))]
    pub grade: Option<String>,
    #[validate(length(max = 10))]
    pub division: Option<String>,
    #[validate(length(max = 100))]
    pub board: Option<String>,
    #[validate(nested)]
    pub weekly_schedule: Option<WeeklySchedule>,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub parent_name: Option<String>,
    #[validate(length(max = 30))]
    pub parent_contact: Option<String>,
    #[validate(length(max = 50))]
    pub admission_number: Option<String>,
    #[validate(length(max = 50))]
    pub roll_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubjectProgressRequest {
    #[validate(range(min = 0.0, max = 100.0))]
    pub progress: f64,
}

fn subject(id: &str, name: &str, color_var: &str, icon: &str, total_topics: u32) -> SubjectProgress {
    SubjectProgress {
        id: id.to_string(),
        name: name.to_string(),
        teacher: None,
        progress: 0.0,
        last_activity: None,
        color_var: color_var.to_string(),
        icon: icon.to_string(),
        total_topics,
        completed_topics: 0,
    }
}

/// Default subjects for Maharashtra Board Std X.
pub fn default_subjects() -> Vec<SubjectProgress> {
    vec![
        subject("math", "Mathematics", "--math-color", "Triangle", 12),
        subject("science", "Science", "--science-color", "Hexagon", 18),
        subject("english", "English", "--language-color", "CircleDot", 10),
        subject("hindi", "Hindi", "--language-color", "CircleDot", 8),
        subject("marathi", "Marathi", "--language-color", "CircleDot", 8),
        subject("socialstudies", "Social Studies", "--history-color", "BookText", 15),
    ]
}

fn period(id: &str, subject: &str, start: &str, end: &str, room: &str) -> SchedulePeriod {
    SchedulePeriod {
        id: id.to_string(),
        subject: subject.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        teacher: None,
        room: Some(room.to_string()),
    }
}

const SLOTS: [(&str, &str); 6] = [
    ("08:00", "08:45"),
    ("08:50", "09:35"),
    ("09:40", "10:25"),
    ("10:45", "11:30"),
    ("11:35", "12:20"),
    ("12:25", "13:10"),
];

fn day(prefix: &str, lessons: &[(&str, &str)]) -> ScheduleDay {
    ScheduleDay {
        periods: lessons
            .iter()
            .zip(SLOTS.iter())
            .enumerate()
            .map(|(i, ((subject, room), (start, end)))| {
                period(&format!("{}{}", prefix, i + 1), subject, start, end, room)
            })
            .collect(),
    }
}

pub fn default_weekly_schedule() -> WeeklySchedule {
    WeeklySchedule {
        monday: day(
            "mon",
            &[
                ("Mathematics", "10A"),
                ("Science", "Lab 2"),
                ("English", "10A"),
                ("Hindi", "10A"),
                ("Social Studies", "10A"),
                ("Marathi", "10A"),
            ],
        ),
        tuesday: day(
            "tue",
            &[
                ("Science", "Lab 1"),
                ("Mathematics", "10A"),
                ("Social Studies", "10A"),
                ("English", "10A"),
                ("Marathi", "10A"),
                ("Hindi", "10A"),
            ],
        ),
        wednesday: day(
            "wed",
            &[
                ("Mathematics", "10A"),
                ("Science", "Lab 3"),
                ("Hindi", "10A"),
                ("Social Studies", "10A"),
                ("English", "10A"),
                ("Marathi", "10A"),
            ],
        ),
        thursday: day(
            "thu",
            &[
                ("Science", "Lab 2"),
                ("Social Studies", "10A"),
                ("Mathematics", "10A"),
                ("Hindi", "10A"),
                ("Marathi", "10A"),
                ("English", "10A"),
            ],
        ),
        friday: day(
            "fri",
            &[
                ("Mathematics", "10A"),
                ("English", "10A"),
                ("Science", "Lab 1"),
                ("Social Studies", "10A"),
                ("Hindi", "10A"),
                ("Marathi", "10A"),
            ],
        ),
        saturday: day(
            "sat",
            &[
                ("Science", "Lab 3"),
                ("Mathematics", "10A"),
                ("Social Studies", "10A"),
                ("English", "10A"),
            ],
        ),
    }
}
