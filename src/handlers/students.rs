use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::catalog::{Faculty, NewStudent, Student};
use crate::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

// ─── POST /api/students ──────────────────────────────────────────

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewStudent>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = state.academics.create_student(req)?;
    Ok((StatusCode::CREATED, Json(student)))
}

// ─── GET /api/students ───────────────────────────────────────────

pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(state.academics.list_students().await?))
}

// ─── GET /api/students/:id ───────────────────────────────────────

pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.academics.find_student(id).await?))
}

// ─── DELETE /api/students/:id ────────────────────────────────────

pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.academics.delete_student(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── GET /api/students/age-between?min=&max= ─────────────────────

pub async fn students_by_age_between(
    State(state): State<Arc<AppState>>,
    Query(range): Query<AgeRange>,
) -> Result<Json<Vec<Student>>, ApiError> {
    if range.min > range.max {
        return Err(ApiError::BadRequest(format!(
            "min ({}) must not exceed max ({})",
            range.min, range.max
        )));
    }
    Ok(Json(
        state.academics.students_by_age_between(range.min, range.max),
    ))
}

// ─── GET /api/students/:id/faculty ───────────────────────────────

pub async fn faculty_of_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Faculty>, ApiError> {
    Ok(Json(state.academics.faculty_of_student(id)?))
}
