// src/services/material_repo.rs

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    error::AppError,
    models::material::{
        GroupField, MaterialPatch, NewMaterial, TeachingMaterial, normalize_tags,
    },
    utils::html::clean_html,
};

/// Filter value that disables the subject or type filter.
pub const FILTER_ALL: &str = "all";

/// Authoritative in-memory list of teaching materials.
///
/// Order is insertion order; every view returned from here preserves it.
#[derive(Debug, Clone, Default)]
pub struct MaterialRepository {
    materials: Vec<TeachingMaterial>,
    selected: Option<String>,
}

impl MaterialRepository {
    pub fn new(materials: Vec<TeachingMaterial>) -> Self {
        Self {
            materials,
            selected: None,
        }
    }

    pub fn all(&self) -> &[TeachingMaterial] {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TeachingMaterial> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Appends a new material stamped with `now` for both dates.
    pub fn add(
        &mut self,
        draft: NewMaterial,
        now: DateTime<Utc>,
    ) -> Result<&TeachingMaterial, AppError> {
        let id = match draft.id {
            Some(id) if self.get(&id).is_some() => {
                return Err(AppError::Conflict(format!("Material '{}' already exists", id)));
            }
            Some(id) => id,
            None => format!("m{}", uuid::Uuid::new_v4().simple()),
        };

        self.materials.push(TeachingMaterial {
            id,
            title: draft.title.trim().to_string(),
            subject: draft.subject,
            topic: draft.topic,
            material_type: draft.material_type,
            content: draft.content.as_deref().map(clean_html),
            file_url: draft.file_url,
            date_created: now,
            date_updated: now,
            tags: normalize_tags(draft.tags),
            status: draft.status,
            description: draft.description,
            version: 1,
        });

        Ok(&self.materials[self.materials.len() - 1])
    }

    /// Merges the present fields of `patch` into the material.
    /// `date_updated` always moves forward and `version` is bumped.
    pub fn update(
        &mut self,
        id: &str,
        patch: MaterialPatch,
        now: DateTime<Utc>,
    ) -> Result<&TeachingMaterial, AppError> {
        let material = self
            .materials
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Material '{}' not found", id)))?;

        if let Some(expected) = patch.expected_version {
            if expected != material.version {
                return Err(AppError::Conflict(format!(
                    "Material '{}' is at version {}, not {}",
                    id, material.version, expected
                )));
            }
        }

        if let Some(title) = patch.title {
            material.title = title.trim().to_string();
        }
        if let Some(subject) = patch.subject {
            material.subject = subject;
        }
        if let Some(topic) = patch.topic {
            material.topic = topic;
        }
        if let Some(material_type) = patch.material_type {
            material.material_type = material_type;
        }
        if let Some(content) = patch.content {
            material.content = Some(clean_html(&content));
        }
        if let Some(file_url) = patch.file_url {
            material.file_url = Some(file_url);
        }
        if let Some(tags) = patch.tags {
            material.tags = normalize_tags(tags);
        }
        if let Some(status) = patch.status {
            material.status = status;
        }
        if let Some(description) = patch.description {
            material.description = Some(description);
        }

        material.date_updated = advance(material.date_updated, now);
        material.version += 1;

        Ok(material)
    }

    /// Deletes the material and drops the selection if it pointed at it.
    pub fn remove(&mut self, id: &str) -> Result<TeachingMaterial, AppError> {
        let pos = self
            .materials
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Material '{}' not found", id)))?;

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }

        Ok(self.materials.remove(pos))
    }

    /// Case-insensitive search over title, description and tags,
    /// combined with exact subject and type filters ("all" disables them).
    pub fn filter(&self, search: &str, subject: &str, material_type: &str) -> Vec<&TeachingMaterial> {
        let needle = search.trim().to_lowercase();
        let subject = subject.trim();
        let material_type = material_type.trim();

        self.materials
            .iter()
            .filter(|m| {
                needle.is_empty()
                    || m.title.to_lowercase().contains(&needle)
                    || m.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || m.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .filter(|m| is_all(subject) || m.subject == subject)
            .filter(|m| is_all(material_type) || m.material_type.as_str() == material_type)
            .collect()
    }

    /// Number of materials per distinct subject or type.
    pub fn group_count(&self, field: GroupField) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.materials {
            let key = match field {
                GroupField::Subject => m.subject.clone(),
                GroupField::Type => m.material_type.as_str().to_string(),
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    pub fn select(&mut self, id: &str) -> Result<(), AppError> {
        if self.get(id).is_none() {
            return Err(AppError::NotFound(format!("Material '{}' not found", id)));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&TeachingMaterial> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }
}

fn is_all(filter: &str) -> bool {
    filter.is_empty() || filter.eq_ignore_ascii_case(FILTER_ALL)
}

/// `now`, or one microsecond past `previous` when the clock has not moved on.
fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}
