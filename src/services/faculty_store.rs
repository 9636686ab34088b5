// src/services/faculty_store.rs

//! Shared faculty workspace: teaching materials, the class roster,
//! assessments and the recent-activity log.
//!
//! Every mutation builds the next state on a copy, writes the changed
//! document through the `DocumentStore`, and only then replaces the
//! in-memory state. A failed write leaves the previous state in place.
//! The write lock is held across the store call, so writes never overlap.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Arc,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    config::ACTIVITY_LOG_CAP,
    database::{self, ASSESSMENTS, DocumentStore, FACULTY_META, MATERIALS, STUDENTS},
    error::AppError,
    models::{
        analytics::{
            Activity, ActivityType, Assessment, AssessmentPatch, ClassAnalytics, NewActivity,
            NewAssessment,
        },
        material::{GroupField, MaterialListParams, MaterialPatch, NewMaterial, TeachingMaterial},
        question::validate_question_set,
        student::{NewStudent, RankedEntry, Student, StudentPatch},
    },
    services::{
        class_analytics,
        leaderboard::{self, entries_from_students},
        material_repo::{FILTER_ALL, MaterialRepository},
    },
};

const META_ID: &str = "class";

/// Per-subject and per-type material counts.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialStats {
    pub total: usize,
    pub by_subject: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
}

/// Persisted alongside the collections: the activity log and the ranks
/// the leaderboard had before the last roster change.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FacultyMeta {
    #[serde(default)]
    activity: Vec<Activity>,
    #[serde(default)]
    rank_snapshot: HashMap<String, u32>,
}

#[derive(Debug, Clone, Default)]
struct FacultyState {
    materials: MaterialRepository,
    students: Vec<Student>,
    assessments: Vec<Assessment>,
    /// Newest first, at most `ACTIVITY_LOG_CAP` entries.
    activity: VecDeque<Activity>,
    previous_ranks: HashMap<String, u32>,
}

impl FacultyState {
    fn push_activity(&mut self, activity: Activity) {
        self.activity.push_front(activity);
        self.activity.truncate(ACTIVITY_LOG_CAP);
    }

    fn student_mut(&mut self, id: &str) -> Result<&mut Student, AppError> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Student '{}' not found", id)))
    }

    fn assessment_mut(&mut self, id: &str) -> Result<&mut Assessment, AppError> {
        self.assessments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Assessment '{}' not found", id)))
    }

    /// Remembers current ranks before the roster changes.
    fn snapshot_ranks(&mut self) {
        self.previous_ranks = leaderboard::rank_snapshot(&self.students);
    }

    fn meta(&self) -> FacultyMeta {
        FacultyMeta {
            activity: self.activity.iter().cloned().collect(),
            rank_snapshot: self.previous_ranks.clone(),
        }
    }
}

pub struct FacultyStore {
    store: Arc<dyn DocumentStore>,
    state: RwLock<FacultyState>,
}

impl FacultyStore {
    /// Reads all faculty collections from the store.
    pub async fn load(store: Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        let materials: Vec<TeachingMaterial> =
            database::list_as(store.as_ref(), MATERIALS).await?;
        let students: Vec<Student> = database::list_as(store.as_ref(), STUDENTS).await?;
        let assessments: Vec<Assessment> =
            database::list_as(store.as_ref(), ASSESSMENTS).await?;
        let meta: FacultyMeta = database::get_as(store.as_ref(), FACULTY_META, META_ID)
            .await?
            .unwrap_or_default();

        tracing::info!(
            "Faculty workspace loaded: {} materials, {} students, {} assessments",
            materials.len(),
            students.len(),
            assessments.len()
        );

        let mut activity: VecDeque<Activity> = meta.activity.into();
        activity.truncate(ACTIVITY_LOG_CAP);

        Ok(Self {
            store,
            state: RwLock::new(FacultyState {
                materials: MaterialRepository::new(materials),
                students,
                assessments,
                activity,
                previous_ranks: meta.rank_snapshot,
            }),
        })
    }

    /// The activity log rides along with the primary write. Losing it does
    /// not fail the request.
    async fn persist_meta(&self, state: &FacultyState) {
        if let Err(e) = database::put_as(self.store.as_ref(), FACULTY_META, META_ID, &state.meta()).await {
            tracing::error!("Failed to persist faculty activity log: {}", e);
        }
    }

    // ---- materials ----

    pub async fn list_materials(&self, params: &MaterialListParams) -> Vec<TeachingMaterial> {
        let state = self.state.read().await;
        state
            .materials
            .filter(
                params.q.as_deref().unwrap_or(""),
                params.subject.as_deref().unwrap_or(FILTER_ALL),
                params.material_type.as_deref().unwrap_or(FILTER_ALL),
            )
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn get_material(&self, id: &str) -> Result<TeachingMaterial, AppError> {
        let state = self.state.read().await;
        state
            .materials
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Material '{}' not found", id)))
    }

    pub async fn add_material(&self, draft: NewMaterial) -> Result<TeachingMaterial, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let material = next.materials.add(draft, Utc::now())?.clone();
        database::put_as(self.store.as_ref(), MATERIALS, &material.id, &material).await?;

        next.push_activity(Activity::now(
            ActivityType::Material,
            "New Teaching Material",
            format!("{} has been added to {}", material.title, material.subject),
        ));
        self.persist_meta(&next).await;
        *state = next;

        tracing::info!("Material created: {} ({})", material.title, material.id);
        Ok(material)
    }

    pub async fn update_material(
        &self,
        id: &str,
        patch: MaterialPatch,
    ) -> Result<TeachingMaterial, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let material = next
            .materials
            .update(id, patch, Utc::now())
            .inspect_err(|e| tracing::warn!("Material update rejected: {}", e))?
            .clone();
        database::put_as(self.store.as_ref(), MATERIALS, &material.id, &material).await?;
        *state = next;

        tracing::info!("Material updated: {} (v{})", material.id, material.version);
        Ok(material)
    }

    pub async fn remove_material(&self, id: &str) -> Result<TeachingMaterial, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let removed = next.materials.remove(id)?;
        database::delete_doc(self.store.as_ref(), MATERIALS, id).await?;
        *state = next;

        tracing::info!("Material deleted: {}", id);
        Ok(removed)
    }

    /// Selection is workspace state only and is not persisted.
    pub async fn select_material(&self, id: &str) -> Result<TeachingMaterial, AppError> {
        let mut state = self.state.write().await;
        state.materials.select(id)?;
        state
            .materials
            .selected()
            .cloned()
            .ok_or_else(|| AppError::InternalServerError("selection vanished".to_string()))
    }

    pub async fn selected_material(&self) -> Option<TeachingMaterial> {
        self.state.read().await.materials.selected().cloned()
    }

    pub async fn material_stats(&self) -> MaterialStats {
        let state = self.state.read().await;
        MaterialStats {
            total: state.materials.len(),
            by_subject: state.materials.group_count(GroupField::Subject),
            by_type: state.materials.group_count(GroupField::Type),
        }
    }

    // ---- students ----

    pub async fn list_students(&self) -> Vec<Student> {
        self.state.read().await.students.clone()
    }

    pub async fn add_student(&self, draft: NewStudent) -> Result<Student, AppError> {
        let mut state = self.state.write().await;

        let id = match draft.id {
            Some(id) if state.students.iter().any(|s| s.id == id) => {
                return Err(AppError::Conflict(format!("Student '{}' already exists", id)));
            }
            Some(id) => id,
            None => format!("s{}", uuid::Uuid::new_v4().simple()),
        };
        let student = Student {
            id,
            name: draft.name.trim().to_string(),
            grade: draft.grade,
            section: draft.section,
            progress: draft.progress,
            last_active: None,
            attendance: draft.attendance,
            areas_of_concern: draft.areas_of_concern,
            strengths: draft.strengths,
            avatar: draft.avatar,
            subject_scores: draft.subject_scores,
        };

        let mut next = state.clone();
        next.snapshot_ranks();
        next.students.push(student.clone());
        database::put_as(self.store.as_ref(), STUDENTS, &student.id, &student).await?;

        next.push_activity(Activity::now(
            ActivityType::Progress,
            "New Student Added",
            format!(
                "{} has been added to class {}-{}",
                student.name, student.grade, student.section
            ),
        ));
        self.persist_meta(&next).await;
        *state = next;

        tracing::info!("Student added: {} ({})", student.name, student.id);
        Ok(student)
    }

    pub async fn update_student(&self, id: &str, patch: StudentPatch) -> Result<Student, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let touches_ranking = patch.touches_ranking();
        if touches_ranking {
            next.snapshot_ranks();
        }

        let student = next.student_mut(id)?;
        if let Some(name) = patch.name {
            student.name = name.trim().to_string();
        }
        if let Some(grade) = patch.grade {
            student.grade = grade;
        }
        if let Some(section) = patch.section {
            student.section = section;
        }
        if let Some(progress) = patch.progress {
            student.progress = progress;
        }
        if let Some(attendance) = patch.attendance {
            student.attendance = attendance;
        }
        if let Some(concerns) = patch.areas_of_concern {
            student.areas_of_concern = concerns;
        }
        if let Some(strengths) = patch.strengths {
            student.strengths = strengths;
        }
        if let Some(avatar) = patch.avatar {
            student.avatar = Some(avatar);
        }
        if let Some(scores) = patch.subject_scores {
            student.subject_scores = scores;
        }
        student.last_active = Some(Utc::now());
        let student = student.clone();

        database::put_as(self.store.as_ref(), STUDENTS, &student.id, &student).await?;
        if touches_ranking {
            self.persist_meta(&next).await;
        }
        *state = next;

        tracing::info!("Student updated: {}", student.id);
        Ok(student)
    }

    pub async fn remove_student(&self, id: &str) -> Result<Student, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let pos = next
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Student '{}' not found", id)))?;
        next.snapshot_ranks();
        let removed = next.students.remove(pos);

        database::delete_doc(self.store.as_ref(), STUDENTS, id).await?;
        self.persist_meta(&next).await;
        *state = next;

        tracing::info!("Student removed: {}", id);
        Ok(removed)
    }

    pub async fn leaderboard(&self) -> Vec<RankedEntry> {
        let state = self.state.read().await;
        leaderboard::rank(entries_from_students(&state.students, &state.previous_ranks))
    }

    // ---- assessments ----

    pub async fn list_assessments(&self) -> Vec<Assessment> {
        self.state.read().await.assessments.clone()
    }

    pub async fn add_assessment(&self, draft: NewAssessment) -> Result<Assessment, AppError> {
        validate_question_set(&draft.questions)?;

        let mut state = self.state.write().await;
        let id = match draft.id {
            Some(id) if state.assessments.iter().any(|a| a.id == id) => {
                return Err(AppError::Conflict(format!("Assessment '{}' already exists", id)));
            }
            Some(id) => id,
            None => format!("a{}", uuid::Uuid::new_v4().simple()),
        };
        let assessment = Assessment {
            id,
            title: draft.title.trim().to_string(),
            date: draft.date,
            progress: 0.0,
            description: draft.description,
            subject: draft.subject,
            assessment_type: draft.assessment_type,
            status: draft.status,
            questions: draft.questions,
        };

        let mut next = state.clone();
        next.assessments.push(assessment.clone());
        database::put_as(self.store.as_ref(), ASSESSMENTS, &assessment.id, &assessment).await?;

        next.push_activity(Activity::now(
            ActivityType::Assessment,
            "New Assessment Created",
            format!("{} scheduled for {}", assessment.title, assessment.date),
        ));
        self.persist_meta(&next).await;
        *state = next;

        tracing::info!("Assessment created: {} ({})", assessment.title, assessment.id);
        Ok(assessment)
    }

    pub async fn update_assessment(
        &self,
        id: &str,
        patch: AssessmentPatch,
    ) -> Result<Assessment, AppError> {
        if let Some(questions) = &patch.questions {
            validate_question_set(questions)?;
        }

        let mut state = self.state.write().await;
        let mut next = state.clone();

        let assessment = next.assessment_mut(id)?;
        if let Some(title) = patch.title {
            assessment.title = title.trim().to_string();
        }
        if let Some(date) = patch.date {
            assessment.date = date;
        }
        if let Some(progress) = patch.progress {
            assessment.progress = progress.clamp(0.0, 100.0);
        }
        if let Some(description) = patch.description {
            assessment.description = Some(description);
        }
        if let Some(subject) = patch.subject {
            assessment.subject = Some(subject);
        }
        if let Some(assessment_type) = patch.assessment_type {
            assessment.assessment_type = Some(assessment_type);
        }
        if let Some(status) = patch.status {
            assessment.status = status;
        }
        if let Some(questions) = patch.questions {
            assessment.questions = questions;
        }
        let assessment = assessment.clone();

        database::put_as(self.store.as_ref(), ASSESSMENTS, &assessment.id, &assessment).await?;
        *state = next;

        tracing::info!("Assessment updated: {}", assessment.id);
        Ok(assessment)
    }

    pub async fn remove_assessment(&self, id: &str) -> Result<Assessment, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let pos = next
            .assessments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Assessment '{}' not found", id)))?;
        let removed = next.assessments.remove(pos);

        database::delete_doc(self.store.as_ref(), ASSESSMENTS, id).await?;
        *state = next;

        tracing::info!("Assessment removed: {}", id);
        Ok(removed)
    }

    // ---- activity & analytics ----

    /// Logs a custom entry. Unlike the automatic entries this is the
    /// primary write, so a store failure is returned to the caller.
    pub async fn add_activity(&self, draft: NewActivity) -> Result<Activity, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let activity = Activity::now(draft.activity_type, draft.title.trim(), draft.description);
        next.push_activity(activity.clone());
        database::put_as(self.store.as_ref(), FACULTY_META, META_ID, &next.meta()).await?;
        *state = next;

        Ok(activity)
    }

    pub async fn recent_activity(&self) -> Vec<Activity> {
        self.state.read().await.activity.iter().cloned().collect()
    }

    pub async fn analytics(&self) -> ClassAnalytics {
        let state = self.state.read().await;
        let activity: Vec<Activity> = state.activity.iter().cloned().collect();
        class_analytics::compute(&state.students, &state.assessments, &activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::MemoryDocumentStore,
        models::material::{MaterialStatus, MaterialType},
    };

    async fn workspace() -> (Arc<MemoryDocumentStore>, FacultyStore) {
        let docs = Arc::new(MemoryDocumentStore::new());
        let faculty = FacultyStore::load(docs.clone()).await.unwrap();
        (docs, faculty)
    }

    fn new_student(id: &str, name: &str, progress: f64) -> NewStudent {
        NewStudent {
            id: Some(id.to_string()),
            name: name.to_string(),
            grade: "10".to_string(),
            section: "A".to_string(),
            progress,
            attendance: 90.0,
            areas_of_concern: vec![],
            strengths: vec![],
            avatar: None,
            subject_scores: vec![],
        }
    }

    #[tokio::test]
    async fn add_material_logs_activity_and_survives_reload() {
        let (docs, faculty) = workspace().await;
        let material = faculty
            .add_material(NewMaterial::titled(
                "Chemical Bonding Introduction",
                "Science",
                MaterialType::Notes,
            ))
            .await
            .unwrap();

        let activity = faculty.recent_activity().await;
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].title, "New Teaching Material");
        assert_eq!(
            activity[0].description,
            "Chemical Bonding Introduction has been added to Science"
        );

        let reloaded = FacultyStore::load(docs).await.unwrap();
        assert_eq!(reloaded.get_material(&material.id).await.unwrap(), material);
        assert_eq!(reloaded.recent_activity().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let (docs, faculty) = workspace().await;
        let material = faculty
            .add_material(NewMaterial::titled("Linear Equations", "Mathematics", MaterialType::Worksheet))
            .await
            .unwrap();

        docs.set_fail_writes(true);
        let patch = MaterialPatch {
            status: Some(MaterialStatus::Published),
            ..Default::default()
        };
        let err = faculty.update_material(&material.id, patch).await.unwrap_err();
        assert!(matches!(err, AppError::PersistenceError(_)));
        assert!(faculty.remove_material(&material.id).await.is_err());

        let current = faculty.get_material(&material.id).await.unwrap();
        assert_eq!(current.status, MaterialStatus::Draft);
        assert_eq!(current.version, 1);
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let (_, faculty) = workspace().await;
        let material = faculty
            .add_material(NewMaterial::titled("Motion", "Science", MaterialType::Video))
            .await
            .unwrap();

        let first = MaterialPatch {
            title: Some("Motion and Forces".into()),
            expected_version: Some(1),
            ..Default::default()
        };
        assert_eq!(faculty.update_material(&material.id, first).await.unwrap().version, 2);

        let stale = MaterialPatch {
            title: Some("Lost update".into()),
            expected_version: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            faculty.update_material(&material.id, stale).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn leaderboard_reports_movement_after_progress_change() {
        let (_, faculty) = workspace().await;
        faculty.add_student(new_student("s1", "Aarav", 90.0)).await.unwrap();
        faculty.add_student(new_student("s2", "Diya", 80.0)).await.unwrap();

        let patch = StudentPatch {
            progress: Some(95.0),
            ..Default::default()
        };
        faculty.update_student("s2", patch).await.unwrap();

        let board = faculty.leaderboard().await;
        assert_eq!(board[0].entry.id, "s2");
        assert_eq!(board[0].movement, 1);
        assert_eq!(board[1].entry.id, "s1");
        assert_eq!(board[1].movement, -1);
    }

    #[tokio::test]
    async fn duplicate_student_id_is_a_conflict() {
        let (_, faculty) = workspace().await;
        faculty.add_student(new_student("s1", "Aarav", 90.0)).await.unwrap();
        assert!(matches!(
            faculty.add_student(new_student("s1", "Other", 10.0)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn activity_log_is_capped_and_newest_first() {
        let (_, faculty) = workspace().await;
        for i in 0..(ACTIVITY_LOG_CAP + 5) {
            faculty
                .add_activity(NewActivity {
                    activity_type: ActivityType::Progress,
                    title: format!("Entry {}", i),
                    description: String::new(),
                })
                .await
                .unwrap();
        }

        let activity = faculty.recent_activity().await;
        assert_eq!(activity.len(), ACTIVITY_LOG_CAP);
        assert_eq!(activity[0].title, format!("Entry {}", ACTIVITY_LOG_CAP + 4));
    }
}
