// src/models/curriculum.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{material::validate_file_url, question::QuizSummary, validate_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Pdf,
    Notes,
    Worksheet,
    Link,
}

/// A study resource attached to a syllabus topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub title: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_file_url))]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Topic {
    #[validate(length(min = 1, max = 50))]
    pub id: String,
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub resources: Vec<Resource>,
}

impl Topic {
    /// Case-insensitive match on name, description or any subtopic.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .subtopics
                .iter()
                .any(|s| s.to_lowercase().contains(needle))
    }
}

/// One subject of the syllabus, with its topics in teaching order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Subject {
    #[validate(length(min = 1, max = 50))]
    pub id: String,
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub name: String,
    #[validate(nested)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub subtopic_count: usize,
    pub resource_count: usize,
}

impl From<&Topic> for TopicSummary {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id.clone(),
            name: topic.name.clone(),
            description: topic.description.clone(),
            subtopic_count: topic.subtopics.len(),
            resource_count: topic.resources.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    pub topic_count: usize,
    pub topics: Vec<TopicSummary>,
}

/// Full syllabus entry for one topic, plus the quizzes that practise it.
#[derive(Debug, Clone, Serialize)]
pub struct TopicDetail {
    pub subject_id: String,
    pub subject_name: String,
    #[serde(flatten)]
    pub topic: Topic,
    pub quizzes: Vec<QuizSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CurriculumParams {
    pub q: Option<String>,
}
