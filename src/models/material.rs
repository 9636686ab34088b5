// src/models/material.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::models::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Notes,
    Presentation,
    Worksheet,
    Video,
    Interactive,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Notes => "notes",
            MaterialType::Presentation => "presentation",
            MaterialType::Worksheet => "worksheet",
            MaterialType::Video => "video",
            MaterialType::Interactive => "interactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStatus {
    Draft,
    Published,
}

/// A teaching material owned by the faculty workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingMaterial {
    /// Stable across updates.
    pub id: String,
    pub title: String,

    /// Subject name, e.g. "Mathematics" or "Social Studies".
    pub subject: String,

    /// Free-text topic within the subject.
    pub topic: String,

    #[serde(rename = "type")]
    pub material_type: MaterialType,

    /// Sanitized HTML or plain text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reference to an uploaded file or external resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    pub date_created: DateTime<Utc>,

    /// Never earlier than `date_created`; advances on every mutation.
    pub date_updated: DateTime<Utc>,

    /// Unique tags, kept in the order they were added.
    #[serde(default)]
    pub tags: Vec<String>,

    pub status: MaterialStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Starts at 1 and increments on every mutation.
    pub version: u64,
}

fn default_title() -> String {
    "Untitled Material".to_string()
}

fn default_subject() -> String {
    "Mathematics".to_string()
}

fn default_topic() -> String {
    "General".to_string()
}

fn default_type() -> MaterialType {
    MaterialType::Notes
}

fn default_status() -> MaterialStatus {
    MaterialStatus::Draft
}

/// DTO for creating a new teaching material.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMaterial {
    /// Caller-provided id. A fresh one is generated when absent.
    #[validate(length(min = 1, max = 100))]
    pub id: Option<String>,
    #[serde(default = "default_title")]
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub title: String,
    #[serde(default = "default_subject")]
    #[validate(length(min = 1, max = 50))]
    pub subject: String,
    #[serde(default = "default_topic")]
    #[validate(length(min = 1, max = 100))]
    pub topic: String,
    #[serde(rename = "type", default = "default_type")]
    pub material_type: MaterialType,
    #[validate(length(max = 50000))]
    pub content: Option<String>,
    #[validate(length(max = 500), custom(function = validate_file_url))]
    pub file_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,
    #[serde(default = "default_status")]
    pub status: MaterialStatus,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl NewMaterial {
    pub fn titled(title: &str, subject: &str, material_type: MaterialType) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            subject: subject.to_string(),
            topic: default_topic(),
            material_type,
            content: None,
            file_url: None,
            tags: Vec::new(),
            status: MaterialStatus::Draft,
            description: None,
        }
    }
}

/// DTO for updating a teaching material. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MaterialPatch {
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
    #[serde(rename = "type")]
    pub material_type: Option<MaterialType>,
    #[validate(length(max = 50000))]
    pub content: Option<String>,
    #[validate(length(max = 500), custom(function = validate_file_url))]
    pub file_url: Option<String>,
    #[validate(custom(function = validate_tags))]
    pub tags: Option<Vec<String>>,
    pub status: Option<MaterialStatus>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// When present, the update is rejected unless it matches the stored version.
    pub expected_version: Option<u64>,
}

/// Field used by `MaterialRepository::group_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupField {
    Subject,
    Type,
}

/// Query parameters for listing materials.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialListParams {
    pub q: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub material_type: Option<String>,
}

/// Accepts absolute URLs and site-relative paths such as `/assets/worksheet.pdf`.
pub fn validate_file_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.starts_with('/') && !url.starts_with("//") {
        return Ok(());
    }
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.len() > 30 {
        return Err(validator::ValidationError::new("too_many_tags"));
    }
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(validator::ValidationError::new("tag_cannot_be_empty"));
        }
        if tag.len() > 50 {
            return Err(validator::ValidationError::new("tag_too_long"));
        }
    }
    Ok(())
}

/// Trims tags and drops duplicates, keeping first occurrences.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
