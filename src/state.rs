// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    database::DocumentStore,
    error::AppError,
    services::{
        curriculum::Curriculum, faculty_store::FacultyStore, profile_store::ProfileStore,
        quiz_catalog::QuizCatalog, quiz_results::QuizResultStore, quiz_sessions::QuizSessions,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<QuizCatalog>,
    pub curriculum: Arc<Curriculum>,
    pub sessions: Arc<QuizSessions>,
    pub results: Arc<QuizResultStore>,
    pub faculty: Arc<FacultyStore>,
    pub profiles: Arc<ProfileStore>,
}

impl AppState {
    /// Wires every store to the same document store and loads the
    /// faculty workspace, quiz catalog and syllabus.
    pub async fn build(config: Config, store: Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        let catalog = QuizCatalog::load(config.quiz_catalog_path.as_deref())?;
        let curriculum = Curriculum::load(config.curriculum_path.as_deref())?;
        let faculty = FacultyStore::load(store.clone()).await?;

        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            curriculum: Arc::new(curriculum),
            sessions: Arc::new(QuizSessions::new()),
            results: Arc::new(QuizResultStore::new(store.clone())),
            faculty: Arc::new(faculty),
            profiles: Arc::new(ProfileStore::new(store)),
        })
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<FacultyStore> {
    fn from_ref(state: &AppState) -> Self {
        state.faculty.clone()
    }
}

impl FromRef<AppState> for Arc<ProfileStore> {
    fn from_ref(state: &AppState) -> Self {
        state.profiles.clone()
    }
}

impl FromRef<AppState> for Arc<QuizCatalog> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}
