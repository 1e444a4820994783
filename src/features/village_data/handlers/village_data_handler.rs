use std::sync::Arc;

use axum::{extract::State, Json};

use crate::features::village_data::dtos::VillageDataResponseDto;
use crate::features::village_data::services::VillageDataService;
use crate::shared::types::ApiResponse;

/// Get the cached village directory
#[utoipa::path(
    get,
    path = "/api/village-data",
    responses(
        (status = 200, description = "Cached officials, activities and events", body = ApiResponse<VillageDataResponseDto>)
    ),
    tag = "village-data"
)]
pub async fn get_village_data(
    State(service): State<Arc<VillageDataService>>,
) -> Json<ApiResponse<VillageDataResponseDto>> {
    Json(ApiResponse::success(Some(service.snapshot().await), None))
}

/// Re-fetch the village directory
///
/// A failed fetch still answers 200: the previous lists are returned with
/// `error` set.
#[utoipa::path(
    post,
    path = "/api/village-data/refresh",
    responses(
        (status = 200, description = "Directory after the refresh attempt", body = ApiResponse<VillageDataResponseDto>)
    ),
    tag = "village-data"
)]
pub async fn refresh_village_data(
    State(service): State<Arc<VillageDataService>>,
) -> Json<ApiResponse<VillageDataResponseDto>> {
    let data = service.refresh().await;
    let message = data.error.clone();
    Json(ApiResponse::success(Some(data), message))
}
