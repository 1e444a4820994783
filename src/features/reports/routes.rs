use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportFormService;

/// Create routes for the report form and its camera
pub fn routes(service: Arc<ReportFormService>) -> Router {
    Router::new()
        .route(
            "/api/report-form",
            get(handlers::get_report_form).delete(handlers::discard_report_form),
        )
        .route("/api/report-form/draft", put(handlers::update_draft))
        .route("/api/report-form/acknowledge", post(handlers::acknowledge))
        .route("/api/report-form/submit", post(handlers::submit_report))
        .route("/api/report-form/photo", get(handlers::get_photo))
        .route("/api/report-form/camera/open", post(handlers::open_camera))
        .route(
            "/api/report-form/camera/preview",
            get(handlers::preview_frame),
        )
        .route(
            "/api/report-form/camera/capture",
            post(handlers::capture_photo),
        )
        .route("/api/report-form/camera/close", post(handlers::close_camera))
        .with_state(service)
}
