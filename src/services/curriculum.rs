// src/services/curriculum.rs

use std::collections::HashSet;

use validator::Validate;

use crate::{
    error::AppError,
    models::curriculum::{Subject, SubjectSummary, Topic, TopicDetail, TopicSummary},
    services::quiz_catalog::QuizCatalog,
};

const BUILTIN_CURRICULUM: &str = include_str!("../../data/curriculum.json");

/// Read-only syllabus: subjects, their topics, subtopics and resources.
#[derive(Debug, Clone, Default)]
pub struct Curriculum {
    subjects: Vec<Subject>,
}

impl Curriculum {
    /// Validates every subject. Subject ids are unique, topic ids are
    /// unique within their subject.
    pub fn from_subjects(subjects: Vec<Subject>) -> Result<Self, AppError> {
        let mut subject_ids = HashSet::new();
        for subject in &subjects {
            subject
                .validate()
                .map_err(|e| AppError::ValidationError(format!("subject '{}': {}", subject.id, e)))?;
            if !subject_ids.insert(subject.id.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "duplicate subject id '{}'",
                    subject.id
                )));
            }

            let mut topic_ids = HashSet::new();
            for topic in &subject.topics {
                if !topic_ids.insert(topic.id.as_str()) {
                    return Err(AppError::ValidationError(format!(
                        "duplicate topic id '{}' in subject '{}'",
                        topic.id, subject.id
                    )));
                }
            }
        }

        Ok(Self { subjects })
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let subjects: Vec<Subject> = serde_json::from_str(raw)?;
        Self::from_subjects(subjects)
    }

    /// Reads the syllabus at `path`, or falls back to the bundled one.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let curriculum = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AppError::ConfigError(format!("cannot read curriculum '{}': {}", path, e))
                })?;
                Self::from_json(&raw)?
            }
            None => Self::from_json(BUILTIN_CURRICULUM)?,
        };

        tracing::info!(
            "Loaded curriculum with {} subjects",
            curriculum.subjects.len()
        );
        Ok(curriculum)
    }

    /// Subjects with their topic listings. With a search term only matching
    /// topics are kept, and subjects left without topics are dropped.
    pub fn overview(&self, search: Option<&str>) -> Vec<SubjectSummary> {
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();

        self.subjects
            .iter()
            .filter_map(|subject| {
                let topics: Vec<TopicSummary> = subject
                    .topics
                    .iter()
                    .filter(|t| t.matches(&needle))
                    .map(TopicSummary::from)
                    .collect();
                if topics.is_empty() && !needle.is_empty() {
                    return None;
                }
                Some(SubjectSummary {
                    id: subject.id.clone(),
                    name: subject.name.clone(),
                    topic_count: subject.topics.len(),
                    topics,
                })
            })
            .collect()
    }

    pub fn subject(&self, id: &str) -> Result<&Subject, AppError> {
        self.subjects
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Subject '{}' not found", id)))
    }

    pub fn topic(&self, subject_id: &str, topic_id: &str) -> Result<(&Subject, &Topic), AppError> {
        let subject = self.subject(subject_id)?;
        let topic = subject
            .topics
            .iter()
            .find(|t| t.id == topic_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Topic '{}' not found in subject '{}'",
                    topic_id, subject_id
                ))
            })?;
        Ok((subject, topic))
    }

    /// The topic with its resources and the catalog quizzes covering it.
    pub fn topic_detail(
        &self,
        subject_id: &str,
        topic_id: &str,
        quizzes: &QuizCatalog,
    ) -> Result<TopicDetail, AppError> {
        let (subject, topic) = self.topic(subject_id, topic_id)?;
        Ok(TopicDetail {
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            topic: topic.clone(),
            quizzes: quizzes.for_topic(&subject.id, &topic.name),
        })
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
