// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{curriculum, dashboard, faculty, health, profile, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Everything except `/api/health` requires a bearer token.
/// * `/api/faculty` additionally requires the teacher role.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/quizzes", get(quiz::list_quizzes))
        .route("/quizzes/{id}", get(quiz::get_quiz))
        .route("/quizzes/{id}/sessions", post(quiz::start_session))
        .route("/sessions/{sid}", get(quiz::get_session))
        .route("/sessions/{sid}/select", post(quiz::select_option))
        .route("/sessions/{sid}/submit", post(quiz::submit_answer))
        .route("/sessions/{sid}/next", post(quiz::next_question))
        .route("/sessions/{sid}/previous", post(quiz::previous_question))
        .route("/sessions/{sid}/reset", post(quiz::reset_session))
        .route("/sessions/{sid}/record", post(quiz::record_result))
        .route("/sessions/{sid}/review", get(quiz::review_session));

    let curriculum_routes = Router::new()
        .route("/curriculum", get(curriculum::get_overview))
        .route("/curriculum/{subject}", get(curriculum::get_subject))
        .route("/curriculum/{subject}/{topic}", get(curriculum::get_topic));

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me).put(profile::update_me))
        .route(
            "/me/subjects/{subject_id}",
            put(profile::update_subject_progress),
        )
        .route("/me/schedule/{day}", get(profile::get_schedule))
        .route("/me/results", get(profile::list_my_results));

    let faculty_routes = Router::new()
        .route(
            "/materials",
            get(faculty::list_materials).post(faculty::create_material),
        )
        .route("/materials/selected", get(faculty::get_selected_material))
        .route("/materials/stats", get(faculty::material_stats))
        .route(
            "/materials/{id}",
            get(faculty::get_material)
                .put(faculty::update_material)
                .delete(faculty::delete_material),
        )
        .route("/materials/{id}/select", put(faculty::select_material))
        .route(
            "/students",
            get(faculty::list_students).post(faculty::create_student),
        )
        .route(
            "/students/{id}",
            put(faculty::update_student).delete(faculty::delete_student),
        )
        .route(
            "/assessments",
            get(faculty::list_assessments).post(faculty::create_assessment),
        )
        .route(
            "/assessments/{id}",
            put(faculty::update_assessment).delete(faculty::delete_assessment),
        )
        .route("/analytics", get(faculty::get_analytics))
        .route("/activity", post(faculty::create_activity))
        .route("/leaderboard", get(faculty::get_leaderboard))
        .route_layer(middleware::from_fn(teacher_middleware));

    // Auth first, then the role check on faculty routes
    let protected = Router::new()
        .merge(quiz_routes)
        .merge(curriculum_routes)
        .nest("/profile", profile_routes)
        .route("/dashboard", get(dashboard::get_dashboard))
        .nest("/faculty", faculty_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/health", get(health::health_check))
        .merge(protected);

    Router::new()
        .nest("/api", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
