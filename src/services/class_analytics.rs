// src/services/class_analytics.rs

use std::collections::HashMap;

use crate::models::{
    analytics::{
        Activity, Assessment, AssessmentStatus, ClassAnalytics, PerformanceBands,
        UpcomingAssessment,
    },
    student::Student,
};

const LOW_PROGRESS: f64 = 65.0;
const HIGH_PROGRESS: f64 = 85.0;
const LOW_ATTENDANCE: f64 = 80.0;

/// A topic is flagged once this many students list it.
const TOPIC_FLAG_MIN_STUDENTS: usize = 2;
const TOPIC_LIST_LEN: usize = 5;

pub fn compute(
    students: &[Student],
    assessments: &[Assessment],
    recent_activity: &[Activity],
) -> ClassAnalytics {
    ClassAnalytics {
        student_count: students.len(),
        average_progress: mean(students.iter().map(|s| s.progress)),
        attendance_rate: mean(students.iter().map(|s| s.attendance)),
        topics_trouble: flagged_topics(students.iter().map(|s| &s.areas_of_concern)),
        topics_excel: flagged_topics(students.iter().map(|s| &s.strengths)),
        performance: bands(students),
        upcoming_assessments: assessments
            .iter()
            .filter(|a| a.status != AssessmentStatus::Completed)
            .map(|a| UpcomingAssessment {
                id: a.id.clone(),
                title: a.title.clone(),
                date: a.date,
                progress: a.progress,
            })
            .collect(),
        recent_activity: recent_activity.to_vec(),
    }
}

pub fn bands(students: &[Student]) -> PerformanceBands {
    let low = students.iter().filter(|s| s.progress < LOW_PROGRESS).count();
    let high = students.iter().filter(|s| s.progress > HIGH_PROGRESS).count();
    PerformanceBands {
        low,
        medium: students.len() - low - high,
        high,
        attendance_issues: students
            .iter()
            .filter(|s| s.attendance < LOW_ATTENDANCE)
            .count(),
    }
}

/// Mean rounded to one decimal place, 0 for an empty roster.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64 * 10.0).round() / 10.0
}

/// Topics mentioned by at least two students, most frequent first.
fn flagged_topics<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for list in lists {
        for topic in list {
            *counts.entry(topic.as_str()).or_insert(0) += 1;
        }
    }

    let mut flagged: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|(_, n)| *n >= TOPIC_FLAG_MIN_STUDENTS)
        .collect();
    flagged.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    flagged
        .into_iter()
        .take(TOPIC_LIST_LEN)
        .map(|(topic, _)| topic.to_string())
        .collect()
}
