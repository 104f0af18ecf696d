use axum::{
    middleware as axum_mw,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Student endpoints ───────────────────────────────────
        .route(
            "/api/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/api/students/age-between",
            get(handlers::students::students_by_age_between),
        )
        .route(
            "/api/students/:id",
            get(handlers::students::get_student).delete(handlers::students::delete_student),
        )
        .route(
            "/api/students/:id/faculty",
            get(handlers::students::faculty_of_student),
        )
        // ── Faculty endpoints ───────────────────────────────────
        .route(
            "/api/faculties",
            get(handlers::faculties::list_faculties).post(handlers::faculties::create_faculty),
        )
        .route(
            "/api/faculties/by-name",
            get(handlers::faculties::faculty_by_name),
        )
        .route(
            "/api/faculties/:id",
            get(handlers::faculties::get_faculty).delete(handlers::faculties::delete_faculty),
        )
        .route(
            "/api/faculties/:id/students",
            get(handlers::faculties::students_of_faculty),
        )
        // ── Execution time tracking ─────────────────────────────
        .route("/api/execution-times", get(handlers::stats::list_samples))
        .route("/api/execution-times/stats", get(handlers::stats::get_stats))
        .route(
            "/api/execution-times/stats/stream",
            get(handlers::stats::stats_stream),
        )
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
