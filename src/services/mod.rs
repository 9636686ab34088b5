pub mod class_analytics;
pub mod curriculum;
pub mod faculty_store;
pub mod leaderboard;
pub mod material_repo;
pub mod profile_store;
pub mod quiz_catalog;
pub mod quiz_engine;
pub mod quiz_results;
pub mod quiz_sessions;
