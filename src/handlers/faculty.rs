// src/handlers/faculty.rs

//! Faculty workspace endpoints. Mounted behind `teacher_middleware`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        analytics::{AssessmentPatch, NewActivity, NewAssessment},
        material::{MaterialListParams, MaterialPatch, NewMaterial},
        student::{NewStudent, StudentPatch},
    },
    services::faculty_store::FacultyStore,
};

// ---- materials ----

/// List materials. `q` searches title, description and tags; `subject`
/// and `type` are exact filters where "all" (or absence) disables them.
pub async fn list_materials(
    State(faculty): State<Arc<FacultyStore>>,
    Query(params): Query<MaterialListParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(faculty.list_materials(&params).await))
}

pub async fn get_material(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let material = faculty.get_material(&id).await?;
    Ok(Json(material))
}

pub async fn create_material(
    State(faculty): State<Arc<FacultyStore>>,
    Json(payload): Json<NewMaterial>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::ValidationError(validation_errors.to_string()));
    }

    let material = faculty.add_material(payload).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// Partial update. Send `expected_version` to reject concurrent edits.
pub async fn update_material(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
    Json(payload): Json<MaterialPatch>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::ValidationError(validation_errors.to_string()));
    }

    let material = faculty.update_material(&id, payload).await?;
    Ok(Json(material))
}

pub async fn delete_material(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    faculty.remove_material(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_material(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let material = faculty.select_material(&id).await?;
    Ok(Json(material))
}

pub async fn get_selected_material(
    State(faculty): State<Arc<FacultyStore>>,
) -> Result<impl IntoResponse, AppError> {
    let material = faculty
        .selected_material()
        .await
        .ok_or_else(|| AppError::NotFound("No material selected".to_string()))?;
    Ok(Json(material))
}

pub async fn material_stats(
    State(faculty): State<Arc<FacultyStore>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(faculty.material_stats().await))
}

// ---- students ----

pub async fn list_students(
    State(faculty): State<Arc<FacultyStore>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(faculty.list_students().await))
}

pub async fn create_student(
    State(faculty): State<Arc<FacultyStore>>,
    Json(payload): Json<NewStudent>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let student = faculty.add_student(payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
    Json(payload): Json<StudentPatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let student = faculty.update_student(&id, payload).await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    faculty.remove_student(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Class ranking by progress, with movement since the last roster change.
pub async fn get_leaderboard(
    State(faculty): State<Arc<FacultyStore>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(faculty.leaderboard().await))
}

// ---- assessments ----

pub async fn list_assessments(
    State(faculty): State<Arc<FacultyStore>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(faculty.list_assessments().await))
}

pub async fn create_assessment(
    State(faculty): State<Arc<FacultyStore>>,
    Json(payload): Json<NewAssessment>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assessment = faculty.add_assessment(payload).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

pub async fn update_assessment(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
    Json(payload): Json<AssessmentPatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assessment = faculty.update_assessment(&id, payload).await?;
    Ok(Json(assessment))
}

pub async fn delete_assessment(
    State(faculty): State<Arc<FacultyStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    faculty.remove_assessment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- analytics ----

pub async fn get_analytics(
    State(faculty): State<Arc<FacultyStore>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(faculty.analytics().await))
}

pub async fn create_activity(
    State(faculty): State<Arc<FacultyStore>>,
    Json(payload): Json<NewActivity>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let activity = faculty.add_activity(payload).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}
