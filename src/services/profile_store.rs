// src/services/profile_store.rs

use std::sync::Arc;

use chrono::{Utc, Weekday};
use tokio::sync::Mutex;

use crate::{
    database::{self, DocumentStore, PROFILES},
    error::AppError,
    models::user::{
        Identity, ProfilePatch, SchedulePeriod, SubjectProgress, UserProfile, default_subjects,
        default_weekly_schedule,
    },
};

/// Per-user profile documents.
///
/// Writes are serialized through one mutex; each one reads the current
/// document, applies the change and writes it back.
pub struct ProfileStore {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn fetch(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        database::get_as(self.store.as_ref(), PROFILES, uid).await
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), AppError> {
        database::put_as(self.store.as_ref(), PROFILES, &profile.uid, profile).await
    }

    /// Returns the caller's profile, creating it on first sign-in and
    /// backfilling the default subjects and timetable when they are missing.
    pub async fn load_or_init(&self, identity: &Identity) -> Result<UserProfile, AppError> {
        if let Some(profile) = self.fetch(&identity.uid).await? {
            if !profile.subjects.is_empty() && profile.weekly_schedule.is_some() {
                return Ok(profile);
            }
        }

        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let profile = match self.fetch(&identity.uid).await? {
            None => {
                tracing::info!("Creating profile for user {}", identity.uid);
                UserProfile::new_for(identity, now)
            }
            Some(mut profile) => {
                if profile.subjects.is_empty() {
                    profile.subjects = default_subjects();
                }
                if profile.weekly_schedule.is_none() {
                    profile.weekly_schedule = Some(default_weekly_schedule());
                }
                profile.updated_at = now;
                tracing::info!("Backfilled default subjects for user {}", identity.uid);
                profile
            }
        };

        self.save(&profile).await?;
        Ok(profile)
    }

    pub async fn get(&self, uid: &str) -> Result<UserProfile, AppError> {
        self.fetch(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", uid)))
    }

    pub async fn update(&self, uid: &str, patch: ProfilePatch) -> Result<UserProfile, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut profile = self.get(uid).await?;

        if let Some(display_name) = patch.display_name {
            profile.display_name = display_name.trim().to_string();
        }
        if let Some(school) = patch.school {
            profile.school = Some(school);
        }
        if let Some(grade) = patch.grade {
            profile.grade = Some(grade);
        }
        if let Some(division) = patch.division {
            profile.division = Some(division);
        }
        if let Some(board) = patch.board {
            profile.board = Some(board);
        }
        if let Some(schedule) = patch.weekly_schedule {
            profile.weekly_schedule = Some(schedule);
        }
        if let Some(photo_url) = patch.photo_url {
            profile.photo_url = Some(photo_url);
        }
        if let Some(phone_number) = patch.phone_number {
            profile.phone_number = Some(phone_number);
        }
        if let Some(address) = patch.address {
            profile.address = Some(address);
        }
        if let Some(parent_name) = patch.parent_name {
            profile.parent_name = Some(parent_name);
        }
        if let Some(parent_contact) = patch.parent_contact {
            profile.parent_contact = Some(parent_contact);
        }
        if let Some(admission_number) = patch.admission_number {
            profile.admission_number = Some(admission_number);
        }
        if let Some(roll_number) = patch.roll_number {
            profile.roll_number = Some(roll_number);
        }
        profile.updated_at = Utc::now();

        self.save(&profile).await?;
        tracing::info!("Profile updated for user {}", uid);
        Ok(profile)
    }

    /// Sets progress on one subject and derives the completed topic count.
    pub async fn update_subject_progress(
        &self,
        uid: &str,
        subject_id: &str,
        progress: f64,
    ) -> Result<SubjectProgress, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut profile = self.get(uid).await?;
        let now = Utc::now();

        let subject = profile
            .subjects
            .iter_mut()
            .find(|s| s.id == subject_id)
            .ok_or_else(|| AppError::NotFound(format!("Subject '{}' not found", subject_id)))?;
        apply_progress(subject, progress);
        subject.last_activity = Some(now);
        let subject = subject.clone();

        profile.updated_at = now;
        self.save(&profile).await?;
        Ok(subject)
    }

    pub async fn schedule(&self, uid: &str, day: Weekday) -> Result<Vec<SchedulePeriod>, AppError> {
        let profile = self.get(uid).await?;
        Ok(profile
            .weekly_schedule
            .as_ref()
            .map(|schedule| schedule.day(day).to_vec())
            .unwrap_or_default())
    }
}

fn apply_progress(subject: &mut SubjectProgress, progress: f64) {
    let progress = progress.clamp(0.0, 100.0);
    subject.progress = progress;
    subject.completed_topics = (f64::from(subject.total_topics) * progress / 100.0).floor() as u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::MemoryDocumentStore, models::user::Role};

    fn identity(uid: &str) -> Identity {
        Identity {
            uid: uid.to_string(),
            display_name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            role: Role::Student,
        }
    }

    #[test]
    fn completed_topics_round_down() {
        let mut science = default_subjects().remove(1);
        apply_progress(&mut science, 50.0);
        assert_eq!(science.completed_topics, 9);
        apply_progress(&mut science, 99.0);
        assert_eq!(science.completed_topics, 17);
        apply_progress(&mut science, 140.0);
        assert_eq!(science.progress, 100.0);
        assert_eq!(science.completed_topics, 18);
    }

    #[tokio::test]
    async fn first_load_creates_and_second_load_reuses() {
        let profiles = ProfileStore::new(Arc::new(MemoryDocumentStore::new()));
        let created = profiles.load_or_init(&identity("u1")).await.unwrap();
        let again = profiles.load_or_init(&identity("u1")).await.unwrap();
        assert_eq!(created, again);
        assert_eq!(created.subjects.len(), 6);
    }

    #[tokio::test]
    async fn empty_subjects_are_backfilled() {
        let docs = Arc::new(MemoryDocumentStore::new());
        let profiles = ProfileStore::new(docs.clone());
        let mut profile = UserProfile::new_for(&identity("u1"), Utc::now());
        profile.subjects.clear();
        database::put_as(&*docs, PROFILES, "u1", &profile).await.unwrap();

        let loaded = profiles.load_or_init(&identity("u1")).await.unwrap();
        assert_eq!(loaded.subjects.len(), 6);
        assert_eq!(profiles.get("u1").await.unwrap().subjects.len(), 6);
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let profiles = ProfileStore::new(Arc::new(MemoryDocumentStore::new()));
        profiles.load_or_init(&identity("u1")).await.unwrap();
        assert!(matches!(
            profiles.update_subject_progress("u1", "latin", 50.0).await,
            Err(AppError::NotFound(_))
        ));
    }
}
