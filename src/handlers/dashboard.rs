// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::{
    config::DASHBOARD_LEADERBOARD_SIZE,
    error::AppError,
    models::{
        analytics::ClassAnalytics,
        quiz_result::QuizResult,
        student::RankedEntry,
        user::{Role, SchedulePeriod, UserProfile},
    },
    state::AppState,
    utils::jwt::Claims,
};

const RECENT_RESULTS: usize = 5;

/// Landing page data, chosen by the role in the caller's token.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Student {
        profile: UserProfile,
        today: Vec<SchedulePeriod>,
        recent_results: Vec<QuizResult>,
    },
    Teacher {
        profile: UserProfile,
        analytics: ClassAnalytics,
        leaderboard: Vec<RankedEntry>,
    },
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profiles.load_or_init(&claims.identity()).await?;

    let dashboard = match claims.role {
        Role::Student => {
            let today = profile
                .weekly_schedule
                .as_ref()
                .map(|s| s.day(Utc::now().weekday()).to_vec())
                .unwrap_or_default();
            let mut recent_results = state.results.list_for_user(&claims.sub).await?;
            recent_results.truncate(RECENT_RESULTS);

            Dashboard::Student {
                profile,
                today,
                recent_results,
            }
        }
        Role::Teacher => {
            let mut leaderboard = state.faculty.leaderboard().await;
            leaderboard.truncate(DASHBOARD_LEADERBOARD_SIZE);

            Dashboard::Teacher {
                profile,
                analytics: state.faculty.analytics().await,
                leaderboard,
            }
        }
    };

    Ok(Json(dashboard))
}
