use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::catalog::{Faculty, NewFaculty, Student};
use crate::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

// ─── POST /api/faculties ─────────────────────────────────────────

pub async fn create_faculty(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewFaculty>,
) -> (StatusCode, Json<Faculty>) {
    (StatusCode::CREATED, Json(state.academics.create_faculty(req)))
}

// ─── GET /api/faculties ──────────────────────────────────────────

pub async fn list_faculties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Faculty>>, ApiError> {
    Ok(Json(state.academics.list_faculties().await?))
}

// ─── GET /api/faculties/:id ──────────────────────────────────────

pub async fn get_faculty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Faculty>, ApiError> {
    Ok(Json(state.academics.find_faculty(id).await?))
}

// ─── DELETE /api/faculties/:id ───────────────────────────────────

pub async fn delete_faculty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.academics.delete_faculty(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── GET /api/faculties/by-name?name= ────────────────────────────

pub async fn faculty_by_name(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Faculty>, ApiError> {
    Ok(Json(state.academics.faculty_by_name(&query.name)?))
}

// ─── GET /api/faculties/:id/students ─────────────────────────────

pub async fn students_of_faculty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(state.academics.students_of_faculty(id)?))
}
