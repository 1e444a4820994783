use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::core::error::Result;
use crate::features::reports::dtos::ReportFormResponseDto;
use crate::features::reports::services::ReportFormService;
use crate::shared::types::ApiResponse;

/// Open the rear camera
///
/// Any stream already held is released first.
#[utoipa::path(
    post,
    path = "/api/report-form/camera/open",
    responses(
        (status = 200, description = "Camera open", body = ApiResponse<ReportFormResponseDto>),
        (status = 503, description = "Camera cannot be accessed")
    ),
    tag = "camera"
)]
pub async fn open_camera(
    State(service): State<Arc<ReportFormService>>,
) -> Result<Json<ApiResponse<ReportFormResponseDto>>> {
    let form = service.open_camera().await?;
    Ok(Json(ApiResponse::success(Some(form), None)))
}

/// Current live frame as JPEG
#[utoipa::path(
    get,
    path = "/api/report-form/camera/preview",
    responses(
        (status = 200, description = "Live frame (image/jpeg)"),
        (status = 409, description = "Camera is not open")
    ),
    tag = "camera"
)]
pub async fn preview_frame(State(service): State<Arc<ReportFormService>>) -> Result<Response> {
    let frame = service.preview().await?;
    Ok((
        [
            (header::CONTENT_TYPE, frame.content_type()),
            (header::CACHE_CONTROL, "no-store"),
        ],
        frame.bytes,
    )
        .into_response())
}

/// Capture a photo and close the camera
///
/// The photo replaces any photo already attached to the draft.
#[utoipa::path(
    post,
    path = "/api/report-form/camera/capture",
    responses(
        (status = 200, description = "Photo attached, camera closed", body = ApiResponse<ReportFormResponseDto>),
        (status = 409, description = "Camera is not open or a submission is in progress")
    ),
    tag = "camera"
)]
pub async fn capture_photo(
    State(service): State<Arc<ReportFormService>>,
) -> Result<Json<ApiResponse<ReportFormResponseDto>>> {
    let form = service.capture_photo().await?;
    Ok(Json(ApiResponse::success(Some(form), None)))
}

/// Close the camera without capturing
#[utoipa::path(
    post,
    path = "/api/report-form/camera/close",
    responses(
        (status = 200, description = "Camera closed", body = ApiResponse<ReportFormResponseDto>)
    ),
    tag = "camera"
)]
pub async fn close_camera(
    State(service): State<Arc<ReportFormService>>,
) -> Json<ApiResponse<ReportFormResponseDto>> {
    Json(ApiResponse::success(Some(service.close_camera().await), None))
}
