use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::village_data::handlers;
use crate::features::village_data::services::VillageDataService;

/// Create routes for the village directory
pub fn routes(service: Arc<VillageDataService>) -> Router {
    Router::new()
        .route("/api/village-data", get(handlers::get_village_data))
        .route(
            "/api/village-data/refresh",
            post(handlers::refresh_village_data),
        )
        .with_state(service)
}
